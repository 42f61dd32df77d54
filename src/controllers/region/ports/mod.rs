//! Port definitions for the region scheduler.
//!
//! The view layer implements [`RegionObserver`] to receive progress, streamed
//! points and the final outcome of a region job.

pub mod region_observer;

pub use region_observer::{CallbackObserver, RegionObserver};
