#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("resolution must be at least 1 on both axes: {x}x{y}")]
    InvalidSize { x: i64, y: i64 },
}

/// Number of samples along each axis. Both axes are at least 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Resolution {
    x: u32,
    y: u32,
}

impl Resolution {
    pub fn new(x: u32, y: u32) -> Result<Self, ResolutionError> {
        Self::try_from_signed(i64::from(x), i64::from(y))
    }

    /// Accepts untrusted axis counts, e.g. straight from a form field.
    pub fn try_from_signed(x: i64, y: i64) -> Result<Self, ResolutionError> {
        match (u32::try_from(x), u32::try_from(y)) {
            (Ok(ux), Ok(uy)) if ux > 0 && uy > 0 => Ok(Self { x: ux, y: uy }),
            _ => Err(ResolutionError::InvalidSize { x, y }),
        }
    }

    #[must_use]
    pub fn square(side: u32) -> Option<Self> {
        Self::new(side, side).ok()
    }

    #[must_use]
    pub fn x(&self) -> u32 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> u32 {
        self.y
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        u64::from(self.x) * u64::from(self.y)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}
