use crate::core::data::complex::Complex;

#[derive(Debug, Copy, Clone, PartialEq, thiserror::Error)]
pub enum ComplexRectError {
    #[error("complex rect size must be positive: {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
    #[error("complex rect bounds must be finite: {min} .. {max}")]
    NonFinite { min: Complex, max: Complex },
}

/// Axis-aligned region of the complex plane, `min` corner inclusive through `max` corner inclusive.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ComplexRect {
    min: Complex,
    max: Complex,
}

impl ComplexRect {
    pub fn new(min: Complex, max: Complex) -> Result<Self, ComplexRectError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ComplexRectError::NonFinite { min, max });
        }

        let width = max.real - min.real;
        let height = max.imag - min.imag;

        if width <= 0.0 || height <= 0.0 {
            return Err(ComplexRectError::InvalidSize { width, height });
        }

        Ok(Self { min, max })
    }

    /// Builds a rect from `[min, max]` ranges along the real and imaginary axes.
    pub fn from_ranges(x_range: (f64, f64), y_range: (f64, f64)) -> Result<Self, ComplexRectError> {
        Self::new(
            Complex::new(x_range.0, y_range.0),
            Complex::new(x_range.1, y_range.1),
        )
    }

    #[must_use]
    pub fn min(&self) -> Complex {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> Complex {
        self.max
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.real - self.min.real
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.imag - self.min.imag
    }

    #[must_use]
    pub fn center(&self) -> Complex {
        Complex::new(
            self.min.real + self.width() / 2.0,
            self.min.imag + self.height() / 2.0,
        )
    }

    #[must_use]
    pub fn contains_point(&self, point: Complex) -> bool {
        self.min.real <= point.real
            && self.min.imag <= point.imag
            && self.max.real >= point.real
            && self.max.imag >= point.imag
    }
}
