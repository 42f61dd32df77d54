use crate::core::actions::compute_chunk::errors::ChunkExecutionError;

/// Failure of an asynchronous region job, reported through `on_complete`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    #[error("chunk {chunk_index} failed after {attempts} attempts: {reason}")]
    ChunkFailed {
        chunk_index: usize,
        attempts: u32,
        reason: ChunkExecutionError,
    },
    #[error("scheduler has shut down")]
    SchedulerShutDown,
}

/// Failure to bring up the scheduler's threads.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("error creating execution pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("error spawning dispatcher thread: {0}")]
    Spawn(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_failed_message_names_the_chunk() {
        let err = JobError::ChunkFailed {
            chunk_index: 4,
            attempts: 2,
            reason: ChunkExecutionError::Panicked("boom".into()),
        };

        assert_eq!(
            err.to_string(),
            "chunk 4 failed after 2 attempts: execution unit panicked: boom"
        );
    }
}
