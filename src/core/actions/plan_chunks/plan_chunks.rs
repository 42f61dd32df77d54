use crate::core::actions::plan_chunks::ordering::ChunkOrdering;
use crate::core::data::chunk::{axis_step, Chunk, ChunkBounds, ChunkOverlap, ChunkPosition};
use crate::core::data::complex_rect::ComplexRect;
use crate::core::data::resolution::Resolution;
use crate::core::util::calculate_chunks_in_resolution::{
    calculate_chunks_in_resolution, samples_in_chunk,
};

pub const DEFAULT_CHUNK_CAPACITY: u32 = 50;
pub const DEFAULT_SEAM_OVERLAP: f64 = 0.002;

/// Splits a region's sample lattice into bounded chunks.
///
/// The region is sampled at `min + i * step` on each axis with
/// `step = (max - min) / (n - 1)`; every chunk owns a contiguous block of lattice
/// indices, so per-chunk sample counts add up to exactly the requested resolution.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ChunkPlanner {
    capacity: Resolution,
    ordering: ChunkOrdering,
    seam_overlap: f64,
}

impl ChunkPlanner {
    #[must_use]
    pub fn new(capacity: Resolution, ordering: ChunkOrdering, seam_overlap: f64) -> Self {
        Self {
            capacity,
            ordering,
            seam_overlap,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> Resolution {
        self.capacity
    }

    #[must_use]
    pub fn plan(&self, region: ComplexRect, resolution: Resolution, max_iterations: u32) -> Vec<Chunk> {
        let (columns, rows) = calculate_chunks_in_resolution(resolution, self.capacity);
        let x_axis = Axis::new(region.min().real, region.max().real, resolution.x(), self.capacity.x());
        let y_axis = Axis::new(region.min().imag, region.max().imag, resolution.y(), self.capacity.y());

        let mut chunks = Vec::with_capacity((columns as usize) * (rows as usize));

        for row in 0..rows {
            let (y_start, y_end, y_count) = y_axis.slice(row);

            for column in 0..columns {
                let (x_start, x_end, x_count) = x_axis.slice(column);

                let overlap = ChunkOverlap {
                    left: x_axis.seam(column > 0, self.seam_overlap),
                    right: x_axis.seam(column + 1 < columns, self.seam_overlap),
                    bottom: y_axis.seam(row > 0, self.seam_overlap),
                    top: y_axis.seam(row + 1 < rows, self.seam_overlap),
                };

                let chunk_resolution = Resolution::new(x_count, y_count)
                    .unwrap_or(self.capacity);

                chunks.push(Chunk::new(
                    ChunkPosition { column, row },
                    ChunkBounds {
                        x_start,
                        x_end,
                        y_start,
                        y_end,
                    },
                    chunk_resolution,
                    max_iterations,
                    overlap,
                ));
            }
        }

        self.ordering.apply(&mut chunks, columns, rows);

        chunks
    }
}

impl Default for ChunkPlanner {
    fn default() -> Self {
        Self {
            capacity: Resolution::square(DEFAULT_CHUNK_CAPACITY)
                .unwrap_or_else(|| unreachable!("default chunk capacity is non-zero")),
            ordering: ChunkOrdering::default(),
            seam_overlap: DEFAULT_SEAM_OVERLAP,
        }
    }
}

struct Axis {
    min: f64,
    max: f64,
    samples: u32,
    capacity: u32,
    step: f64,
}

impl Axis {
    fn new(min: f64, max: f64, samples: u32, capacity: u32) -> Self {
        Self {
            min,
            max,
            samples,
            capacity,
            step: axis_step(min, max, samples),
        }
    }

    fn coordinate(&self, index: u32) -> f64 {
        if self.samples > 1 && index == self.samples - 1 {
            self.max
        } else {
            self.min + f64::from(index) * self.step
        }
    }

    fn slice(&self, index: u32) -> (f64, f64, u32) {
        let first = index * self.capacity;
        let count = samples_in_chunk(index, self.samples, self.capacity);
        let last = first + count - 1;

        (self.coordinate(first), self.coordinate(last), count)
    }

    fn seam(&self, interior: bool, overlap: f64) -> f64 {
        if interior {
            self.step * overlap
        } else {
            0.0
        }
    }
}
