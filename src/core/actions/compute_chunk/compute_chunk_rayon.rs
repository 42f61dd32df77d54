use std::ops::Range;

use rayon::prelude::*;

use crate::core::actions::cancellation::{CancelToken, Cancelled, CANCEL_CHECK_INTERVAL_POINTS};
use crate::core::actions::compute_chunk::errors::ChunkExecutionError;
use crate::core::actions::compute_chunk::ports::chunk_executor::{ChunkExecutor, PointBatch};
use crate::core::data::chunk::Chunk;
use crate::core::data::complex::Complex;
use crate::core::data::coordinate_key::CoordinateKey;
use crate::core::fractals::mandelbrot::evaluator::EscapeTimeEvaluator;

pub const DEFAULT_BATCH_ROWS: u32 = 10;

/// Escape-time execution unit. Rows of a chunk are computed in parallel on the
/// current rayon pool and delivered `batch_rows` rows at a time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EscapeTimeChunkExecutor {
    evaluator: EscapeTimeEvaluator,
    batch_rows: u32,
}

impl EscapeTimeChunkExecutor {
    #[must_use]
    pub fn new(evaluator: EscapeTimeEvaluator, batch_rows: u32) -> Self {
        Self {
            evaluator,
            batch_rows: batch_rows.max(1),
        }
    }
}

impl Default for EscapeTimeChunkExecutor {
    fn default() -> Self {
        Self::new(EscapeTimeEvaluator::default(), DEFAULT_BATCH_ROWS)
    }
}

impl ChunkExecutor for EscapeTimeChunkExecutor {
    fn execute(
        &self,
        chunk: &Chunk,
        cancel: &dyn CancelToken,
        emit: &mut dyn FnMut(PointBatch),
    ) -> Result<(), ChunkExecutionError> {
        let rows = chunk.resolution().y();
        let mut start = 0;

        while start < rows {
            let end = start.saturating_add(self.batch_rows).min(rows);
            let batch = compute_rows_cancelable(chunk, start..end, &self.evaluator, cancel)?;
            emit(batch);
            start = end;
        }

        Ok(())
    }
}

/// Computes the given rows of `chunk` in parallel, in row-major order.
///
/// Checks for cancellation at the start of each row and every
/// [`CANCEL_CHECK_INTERVAL_POINTS`] points within a row.
pub fn compute_rows_cancelable(
    chunk: &Chunk,
    rows: Range<u32>,
    evaluator: &EscapeTimeEvaluator,
    cancel: &dyn CancelToken,
) -> Result<PointBatch, Cancelled> {
    let row_width = chunk.resolution().x() as usize;
    let max_iterations = chunk.max_iterations();

    let computed: Result<Vec<PointBatch>, Cancelled> = rows
        .into_par_iter()
        .map(|row| {
            let mut out = Vec::with_capacity(row_width);

            for (i, c) in chunk.row_samples(row).enumerate() {
                if i % CANCEL_CHECK_INTERVAL_POINTS == 0 && cancel.is_cancelled() {
                    return Err(Cancelled);
                }

                let result = evaluator.evaluate(Complex::ZERO, c, max_iterations);
                out.push((CoordinateKey::from(c), result));
            }

            Ok(out)
        })
        .collect();

    computed.map(|batches| batches.into_iter().flatten().collect())
}
