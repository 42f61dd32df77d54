use std::thread;

use crate::controllers::engine::errors::EngineError;
use crate::controllers::region::SchedulerOptions;
use crate::core::actions::compute_chunk::compute_chunk_rayon::{
    DEFAULT_BATCH_ROWS, EscapeTimeChunkExecutor,
};
use crate::core::actions::plan_chunks::ordering::ChunkOrdering;
use crate::core::actions::plan_chunks::plan_chunks::{
    ChunkPlanner, DEFAULT_CHUNK_CAPACITY, DEFAULT_SEAM_OVERLAP,
};
use crate::core::data::resolution::Resolution;
use crate::core::fractals::mandelbrot::evaluator::{
    DEFAULT_CYCLE_CHECK_INTERVAL, EscapeTimeEvaluator,
};

/// Tuning knobs for an [`Engine`](crate::Engine).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EngineConfig {
    /// Maximum samples per chunk along each axis.
    pub chunk_capacity: (u32, u32),
    /// Smallest progress step worth reporting, in `[0, 1]`. `1.0` is always reported.
    pub progress_granularity: f64,
    pub ordering: ChunkOrdering,
    /// Size of the chunk execution pool.
    pub workers: usize,
    /// Fraction of a sample step added to chunk extents at interior seams.
    pub seam_overlap: f64,
    /// Iterations between cycle checks in region jobs; 0 disables the check.
    pub cycle_check_interval: u32,
    /// Cardioid, period-2 bulb and bailout shortcuts in region jobs.
    pub fast_paths: bool,
    /// Rows per partial batch streamed back from a chunk.
    pub batch_rows: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_capacity: (DEFAULT_CHUNK_CAPACITY, DEFAULT_CHUNK_CAPACITY),
            progress_granularity: 0.0,
            ordering: ChunkOrdering::RowMajor,
            workers: thread::available_parallelism().map_or(1, usize::from),
            seam_overlap: DEFAULT_SEAM_OVERLAP,
            cycle_check_interval: DEFAULT_CYCLE_CHECK_INTERVAL,
            fast_paths: true,
            batch_rows: DEFAULT_BATCH_ROWS,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        let (x, y) = self.chunk_capacity;
        if x == 0 || y == 0 {
            return Err(EngineError::InvalidConfig(format!(
                "chunk capacity must be positive on both axes, got {x}x{y}"
            )));
        }

        if !(0.0..=1.0).contains(&self.progress_granularity) {
            return Err(EngineError::InvalidConfig(format!(
                "progress granularity must be within [0, 1], got {}",
                self.progress_granularity
            )));
        }

        if self.workers == 0 {
            return Err(EngineError::InvalidConfig(
                "at least one worker is required".to_owned(),
            ));
        }

        if !(0.0..0.5).contains(&self.seam_overlap) {
            return Err(EngineError::InvalidConfig(format!(
                "seam overlap must be within [0, 0.5), got {}",
                self.seam_overlap
            )));
        }

        if self.batch_rows == 0 {
            return Err(EngineError::InvalidConfig(
                "batch rows must be positive".to_owned(),
            ));
        }

        Ok(())
    }

    pub(crate) fn planner(&self) -> Result<ChunkPlanner, EngineError> {
        let (x, y) = self.chunk_capacity;
        let capacity = Resolution::new(x, y)?;
        Ok(ChunkPlanner::new(capacity, self.ordering, self.seam_overlap))
    }

    pub(crate) fn executor(&self) -> EscapeTimeChunkExecutor {
        EscapeTimeChunkExecutor::new(
            EscapeTimeEvaluator::region(self.fast_paths, self.cycle_check_interval),
            self.batch_rows,
        )
    }

    pub(crate) fn scheduler_options(&self) -> Result<SchedulerOptions, EngineError> {
        Ok(SchedulerOptions {
            workers: self.workers,
            planner: self.planner()?,
            progress_granularity: self.progress_granularity,
        })
    }
}
