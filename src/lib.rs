mod controllers;
mod core;

pub use controllers::engine::{
    Engine, EngineConfig, EngineError, GridRequest, PointRequest, RegionRequest,
};
pub use controllers::region::data::job::{JobHandle, JobSummary, RegionJobRequest, SchedulerState};
pub use controllers::region::errors::job::{JobError, SchedulerError};
pub use controllers::region::ports::{CallbackObserver, RegionObserver};
pub use controllers::region::{ComputeScheduler, SchedulerOptions};

pub use crate::core::actions::cancellation::{CancelToken, Cancelled, GenerationToken, NeverCancel};
pub use crate::core::actions::compute_chunk::compute_chunk_rayon::EscapeTimeChunkExecutor;
pub use crate::core::actions::compute_chunk::errors::ChunkExecutionError;
pub use crate::core::actions::compute_chunk::ports::chunk_executor::{ChunkExecutor, PointBatch};
pub use crate::core::actions::plan_chunks::ordering::ChunkOrdering;
pub use crate::core::actions::plan_chunks::plan_chunks::ChunkPlanner;
pub use crate::core::cache::result_cache::{ResultCache, ResultSnapshot};
pub use crate::core::data::analysis_result::{AnalysisResult, SequenceStep};
pub use crate::core::data::chunk::{Chunk, ChunkBounds, ChunkKey, ChunkOverlap, ChunkPosition};
pub use crate::core::data::complex::Complex;
pub use crate::core::data::complex_rect::{ComplexRect, ComplexRectError};
pub use crate::core::data::coordinate_key::{CoordinateKey, CoordinateKeyError};
pub use crate::core::data::resolution::{Resolution, ResolutionError};
pub use crate::core::fractals::mandelbrot::evaluator::{EscapeTimeEvaluator, SequenceRetention};
