//! Region controller: asynchronous, cancellable computation of a viewport.
//!
//! # Architecture
//!
//! - **Input**: `RegionJobRequest` describing the region, resolution and iteration cap
//! - **Output**: `RegionObserver` trait receiving progress, point batches and completion
//! - **Core**: chunk planning, execution and caching from `core/`
//!
//! One job is live at a time. Starting a job supersedes the previous one, and
//! anything the superseded job produces afterwards is discarded.

pub mod data;
pub mod errors;
pub mod events;
pub mod ports;
mod scheduler;

pub use scheduler::{ComputeScheduler, SchedulerOptions};
