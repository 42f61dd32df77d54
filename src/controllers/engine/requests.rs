use crate::controllers::engine::errors::EngineError;
use crate::controllers::region::data::job::RegionJobRequest;
use crate::core::data::complex::Complex;
use crate::core::data::complex_rect::ComplexRect;
use crate::core::data::resolution::Resolution;

/// Iteration cap as supplied by a caller. Zero is valid; negative or oversized is not.
pub(crate) fn validate_iterations(max_iterations: i64) -> Result<u32, EngineError> {
    u32::try_from(max_iterations).map_err(|_| EngineError::InvalidIterationBound(max_iterations))
}

/// Orbit of a single point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointRequest {
    pub z0: Complex,
    pub c: Complex,
    pub max_iterations: i64,
}

/// Square lattice of `size` x `size` parameters centered on `center`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridRequest {
    pub center: Complex,
    pub size: i64,
    pub spacing: f64,
    pub z0: Complex,
    pub max_iterations: i64,
}

impl GridRequest {
    /// Spacing that spreads a `size` x `size` grid over half of the smaller view dimension.
    #[must_use]
    pub fn spacing_for_view(view_width: f64, view_height: f64, size: u32) -> f64 {
        if size <= 1 {
            return 1.0;
        }

        view_width.min(view_height) * 0.5 / f64::from(size - 1)
    }

    pub(crate) fn validate(&self) -> Result<(u32, u32), EngineError> {
        let size = u32::try_from(self.size)
            .ok()
            .filter(|size| size % 2 == 1)
            .ok_or(EngineError::InvalidGridSize(self.size))?;

        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(EngineError::InvalidGridSpacing(self.spacing));
        }

        let max_iterations = validate_iterations(self.max_iterations)?;

        Ok((size, max_iterations))
    }

    /// Lattice points, column by column. `size` must already be validated.
    pub(crate) fn points(&self, size: u32) -> Vec<Complex> {
        let half = f64::from(size - 1) * self.spacing / 2.0;

        (0..size)
            .flat_map(|i| {
                (0..size).map(move |j| {
                    Complex::new(
                        self.center.real - half + f64::from(i) * self.spacing,
                        self.center.imag - half + f64::from(j) * self.spacing,
                    )
                })
            })
            .collect()
    }
}

/// Viewport to compute asynchronously, in complex-plane coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RegionRequest {
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub resolution: (i64, i64),
    pub max_iterations: i64,
}

impl RegionRequest {
    pub(crate) fn validate(&self) -> Result<RegionJobRequest, EngineError> {
        let (x, y) = self.resolution;
        let resolution = Resolution::try_from_signed(x, y)?;
        let max_iterations = validate_iterations(self.max_iterations)?;
        let region = ComplexRect::from_ranges(self.x_range, self.y_range)?;

        Ok(RegionJobRequest {
            region,
            resolution,
            max_iterations,
        })
    }
}
