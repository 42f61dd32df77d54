use crate::core::actions::cancellation::CancelToken;
use crate::core::actions::compute_chunk::errors::ChunkExecutionError;
use crate::core::data::analysis_result::AnalysisResult;
use crate::core::data::chunk::Chunk;
use crate::core::data::coordinate_key::CoordinateKey;

pub type PointBatch = Vec<(CoordinateKey, AnalysisResult)>;

/// Execution unit: turns one chunk into classified points.
///
/// Results are handed to `emit` in one or more batches as they become available.
/// Implementations poll `cancel` and stop with [`ChunkExecutionError::Cancelled`]
/// when asked to; batches already emitted stay emitted.
pub trait ChunkExecutor: Send + Sync {
    fn execute(
        &self,
        chunk: &Chunk,
        cancel: &dyn CancelToken,
        emit: &mut dyn FnMut(PointBatch),
    ) -> Result<(), ChunkExecutionError>;
}
