use crate::core::data::complex_rect::ComplexRect;
use crate::core::data::resolution::Resolution;

/// Validated description of a region computation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RegionJobRequest {
    pub region: ComplexRect,
    pub resolution: Resolution,
    pub max_iterations: u32,
}

/// Identifies one submitted region job.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle {
    generation: u64,
}

impl JobHandle {
    pub(crate) fn new(generation: u64) -> Self {
        Self { generation }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Lifecycle of the most recently submitted job.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Idle,
    Planning,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// What a successful job did.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct JobSummary {
    pub generation: u64,
    pub total_chunks: usize,
    /// Chunks sent to an execution unit and merged.
    pub computed_chunks: usize,
    /// Chunks skipped because the cache already held them.
    pub cached_chunks: usize,
    /// Chunks that failed once and succeeded on retry.
    pub retried_chunks: usize,
    /// Points merged into the cache by this job.
    pub points: u64,
}
