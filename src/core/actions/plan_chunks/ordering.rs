use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::core::data::chunk::Chunk;

/// Order in which planned chunks are dispatched. Only affects the order of
/// progress updates, never the merged result.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ChunkOrdering {
    /// Bottom row first, left to right. Deterministic.
    #[default]
    RowMajor,
    /// Center chunk first, then ring by ring outward, counter-clockwise within a ring.
    Spiral,
    /// Random permutation; a fixed seed makes it reproducible.
    Shuffle { seed: Option<u64> },
}

impl ChunkOrdering {
    /// Reorders chunks generated in row-major order over a `columns` x `rows` grid.
    pub fn apply(self, chunks: &mut [Chunk], columns: u32, rows: u32) {
        match self {
            Self::RowMajor => {}
            Self::Spiral => order_center_outward(chunks, columns, rows),
            Self::Shuffle { seed } => {
                let mut rng = StdRng::seed_from_u64(seed.unwrap_or_else(rand::random));
                chunks.shuffle(&mut rng);
            }
        }
    }
}

fn order_center_outward(chunks: &mut [Chunk], columns: u32, rows: u32) {
    let center_column = f64::from(columns - 1) / 2.0;
    let center_row = f64::from(rows - 1) / 2.0;

    let placement = |chunk: &Chunk| {
        let dx = f64::from(chunk.position().column) - center_column;
        let dy = f64::from(chunk.position().row) - center_row;
        let ring = dx.abs().max(dy.abs());
        let angle = dy.atan2(dx).rem_euclid(TAU);
        (ring, angle)
    };

    chunks.sort_by(|a, b| {
        let (ring_a, angle_a) = placement(a);
        let (ring_b, angle_b) = placement(b);
        ring_a
            .total_cmp(&ring_b)
            .then_with(|| angle_a.total_cmp(&angle_b))
    });
}
