//! Engine facade: the only surface a view layer needs.
//!
//! Point and grid evaluation are synchronous. Region evaluation is handed to the
//! [`ComputeScheduler`](crate::controllers::region::ComputeScheduler) and reported
//! back through a [`RegionObserver`](crate::controllers::region::ports::RegionObserver).

pub mod config;
mod engine;
pub mod errors;
pub mod requests;

pub use config::EngineConfig;
pub use engine::Engine;
pub use errors::EngineError;
pub use requests::{GridRequest, PointRequest, RegionRequest};
