use crate::core::actions::compute_chunk::errors::ChunkExecutionError;
use crate::core::actions::compute_chunk::ports::chunk_executor::PointBatch;

/// Messages from an execution unit back to the dispatcher. Every message is tagged
/// with the job generation it was produced for.
#[derive(Debug)]
pub enum WorkerMessage {
    Batch {
        generation: u64,
        chunk_index: usize,
        points: PointBatch,
    },
    Finished {
        generation: u64,
        chunk_index: usize,
    },
    Failed {
        generation: u64,
        chunk_index: usize,
        error: ChunkExecutionError,
    },
}

impl WorkerMessage {
    #[must_use]
    pub fn generation(&self) -> u64 {
        match self {
            Self::Batch { generation, .. }
            | Self::Finished { generation, .. }
            | Self::Failed { generation, .. } => *generation,
        }
    }
}
