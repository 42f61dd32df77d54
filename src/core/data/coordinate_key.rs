use std::fmt;
use std::str::FromStr;

use crate::core::data::complex::Complex;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateKeyError {
    #[error("coordinate key `{0}` is not of the form `real,imag`")]
    Malformed(String),
}

/// Canonical identity of a sampled point: `"{real},{imag}"` with both parts in their
/// shortest round-trip decimal form. Bit-identical coordinates always produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordinateKey(String);

impl CoordinateKey {
    #[must_use]
    pub fn from_parts(real: f64, imag: f64) -> Self {
        Self(format!("{real},{imag}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recovers the exact coordinate the key was built from.
    pub fn to_complex(&self) -> Result<Complex, CoordinateKeyError> {
        let malformed = || CoordinateKeyError::Malformed(self.0.clone());
        let (real, imag) = self.0.split_once(',').ok_or_else(malformed)?;
        let real = real.parse::<f64>().map_err(|_| malformed())?;
        let imag = imag.parse::<f64>().map_err(|_| malformed())?;

        Ok(Complex::new(real, imag))
    }
}

impl From<Complex> for CoordinateKey {
    fn from(value: Complex) -> Self {
        Self::from_parts(value.real, value.imag)
    }
}

impl FromStr for CoordinateKey {
    type Err = CoordinateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = Self(s.to_owned());
        let point = key.to_complex()?;

        Ok(Self::from(point))
    }
}

impl fmt::Display for CoordinateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
