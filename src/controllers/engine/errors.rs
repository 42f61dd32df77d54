use crate::controllers::region::errors::job::SchedulerError;
use crate::core::data::complex_rect::ComplexRectError;
use crate::core::data::resolution::ResolutionError;

/// Caller input rejected at the engine boundary. No job is started.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid resolution {x}x{y}: both axes must be positive")]
    InvalidResolution { x: i64, y: i64 },
    #[error("invalid iteration bound {0}: must not be negative")]
    InvalidIterationBound(i64),
    #[error("invalid grid size {0}: must be odd and positive")]
    InvalidGridSize(i64),
    #[error("invalid grid spacing {0}: must be positive and finite")]
    InvalidGridSpacing(f64),
    #[error("invalid region: {0}")]
    InvalidRegion(#[from] ComplexRectError),
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}

impl From<ResolutionError> for EngineError {
    fn from(value: ResolutionError) -> Self {
        match value {
            ResolutionError::InvalidSize { x, y } => Self::InvalidResolution { x, y },
        }
    }
}

impl From<SchedulerError> for EngineError {
    fn from(value: SchedulerError) -> Self {
        Self::InvalidConfig(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_error_maps_to_invalid_resolution() {
        let err: EngineError = ResolutionError::InvalidSize { x: 0, y: -3 }.into();

        assert_eq!(err, EngineError::InvalidResolution { x: 0, y: -3 });
        assert_eq!(
            err.to_string(),
            "invalid resolution 0x-3: both axes must be positive"
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            EngineError::InvalidGridSize(4).to_string(),
            "invalid grid size 4: must be odd and positive"
        );
        assert_eq!(
            EngineError::InvalidIterationBound(-1).to_string(),
            "invalid iteration bound -1: must not be negative"
        );
    }
}
