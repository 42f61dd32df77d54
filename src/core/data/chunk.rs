use std::fmt;

use crate::core::data::complex::Complex;
use crate::core::data::resolution::Resolution;

/// Inclusive domain bounds of a rectangular slice of the plane.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ChunkBounds {
    pub x_start: f64,
    pub x_end: f64,
    pub y_start: f64,
    pub y_end: f64,
}

/// Domain-space widening applied to each edge of a chunk's render extent.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ChunkOverlap {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

/// Column/row of a chunk inside the planned chunk grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChunkPosition {
    pub column: u32,
    pub row: u32,
}

/// Canonical identity of a chunk: its bounds, per-chunk resolution and iteration bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkKey(String);

impl ChunkKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable unit of dispatch. Samples lie on a uniform lattice spanning `bounds`
/// inclusively, `resolution.x()` columns by `resolution.y()` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    position: ChunkPosition,
    bounds: ChunkBounds,
    resolution: Resolution,
    max_iterations: u32,
    overlap: ChunkOverlap,
}

impl Chunk {
    #[must_use]
    pub fn new(
        position: ChunkPosition,
        bounds: ChunkBounds,
        resolution: Resolution,
        max_iterations: u32,
        overlap: ChunkOverlap,
    ) -> Self {
        Self {
            position,
            bounds,
            resolution,
            max_iterations,
            overlap,
        }
    }

    #[must_use]
    pub fn position(&self) -> ChunkPosition {
        self.position
    }

    #[must_use]
    pub fn bounds(&self) -> ChunkBounds {
        self.bounds
    }

    #[must_use]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    #[must_use]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    #[must_use]
    pub fn point_count(&self) -> u64 {
        self.resolution.total()
    }

    #[must_use]
    pub fn key(&self) -> ChunkKey {
        let b = self.bounds;
        ChunkKey(format!(
            "{},{},{},{},{},{}",
            b.x_start, b.x_end, b.y_start, b.y_end, self.resolution, self.max_iterations
        ))
    }

    /// Bounds to draw this chunk with, widened at interior edges so independently
    /// rendered neighbours meet without a visible seam.
    #[must_use]
    pub fn extent(&self) -> ChunkBounds {
        ChunkBounds {
            x_start: self.bounds.x_start - self.overlap.left,
            x_end: self.bounds.x_end + self.overlap.right,
            y_start: self.bounds.y_start - self.overlap.bottom,
            y_end: self.bounds.y_end + self.overlap.top,
        }
    }

    #[must_use]
    pub fn step(&self) -> (f64, f64) {
        (
            axis_step(self.bounds.x_start, self.bounds.x_end, self.resolution.x()),
            axis_step(self.bounds.y_start, self.bounds.y_end, self.resolution.y()),
        )
    }

    #[must_use]
    pub fn sample(&self, column: u32, row: u32) -> Complex {
        let (dx, dy) = self.step();
        Complex::new(
            self.bounds.x_start + f64::from(column) * dx,
            self.bounds.y_start + f64::from(row) * dy,
        )
    }

    pub fn row_samples(&self, row: u32) -> impl Iterator<Item = Complex> + '_ {
        (0..self.resolution.x()).map(move |column| self.sample(column, row))
    }
}

pub(crate) fn axis_step(start: f64, end: f64, samples: u32) -> f64 {
    if samples > 1 {
        (end - start) / f64::from(samples - 1)
    } else {
        0.0
    }
}
