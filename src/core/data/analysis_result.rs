use crate::core::data::complex::Complex;

/// One value of the orbit `z_n`, tagged with `n`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SequenceStep {
    pub z: Complex,
    pub iteration: u32,
}

/// Behavioural classification of a point under `z <- z² + c`.
///
/// Single-point queries carry the whole orbit; bulk region results carry only the
/// final step so memory stays proportional to the number of points.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Converges {
        sequence: Vec<SequenceStep>,
    },
    Diverges {
        /// Iteration at which `|z|² > 4` was first observed. Never exceeds the bound used.
        escape_time: u32,
        sequence: Vec<SequenceStep>,
    },
}

impl AnalysisResult {
    #[must_use]
    pub fn converges(&self) -> bool {
        matches!(self, Self::Converges { .. })
    }

    #[must_use]
    pub fn diverges(&self) -> bool {
        matches!(self, Self::Diverges { .. })
    }

    #[must_use]
    pub fn escape_time(&self) -> Option<u32> {
        match self {
            Self::Converges { .. } => None,
            Self::Diverges { escape_time, .. } => Some(*escape_time),
        }
    }

    #[must_use]
    pub fn sequence(&self) -> &[SequenceStep] {
        match self {
            Self::Converges { sequence } | Self::Diverges { sequence, .. } => sequence,
        }
    }

    #[must_use]
    pub fn final_step(&self) -> Option<SequenceStep> {
        self.sequence().last().copied()
    }

    #[must_use]
    pub fn behaviour_label(&self) -> &'static str {
        match self {
            Self::Converges { .. } => "converges",
            Self::Diverges { .. } => "diverges",
        }
    }
}
