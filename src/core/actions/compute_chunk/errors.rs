use crate::core::actions::cancellation::Cancelled;

/// Why an execution unit stopped before delivering a whole chunk.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkExecutionError {
    /// Cooperative abort; expected control flow, not a failure to report.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    #[error("chunk computation failed: {0}")]
    Failed(String),
    #[error("execution unit panicked: {0}")]
    Panicked(String),
}

impl ChunkExecutionError {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}
