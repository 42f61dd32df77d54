use crate::core::data::analysis_result::{AnalysisResult, SequenceStep};
use crate::core::data::complex::Complex;

/// Squared bailout radius: once `|z|² > 4` the orbit is known to escape.
pub const BAILOUT_RADIUS_SQUARED: f64 = 4.0;

pub const DEFAULT_CYCLE_CHECK_INTERVAL: u32 = 20;

// Upper bound on the up-front allocation for a full orbit.
const MAX_SEQUENCE_PREALLOCATION: usize = 1024;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SequenceRetention {
    /// Every `z_n` from `z_0` to the last computed step.
    Full,
    /// Only the last computed step.
    FinalStep,
}

/// Escape-time classifier for `z <- z² + c`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EscapeTimeEvaluator {
    fast_paths: bool,
    cycle_check_interval: u32,
    retention: SequenceRetention,
}

impl EscapeTimeEvaluator {
    /// Plain iteration keeping the whole orbit, for inspecting a single point.
    #[must_use]
    pub fn orbit() -> Self {
        Self {
            fast_paths: false,
            cycle_check_interval: 0,
            retention: SequenceRetention::Full,
        }
    }

    /// Bulk classifier: interior/exterior shortcuts, exact-cycle exit, final step only.
    ///
    /// A `cycle_check_interval` of zero disables cycle detection.
    #[must_use]
    pub fn region(fast_paths: bool, cycle_check_interval: u32) -> Self {
        Self {
            fast_paths,
            cycle_check_interval,
            retention: SequenceRetention::FinalStep,
        }
    }

    #[must_use]
    pub fn retention(&self) -> SequenceRetention {
        self.retention
    }

    /// Classifies `c` starting the orbit from `z0`.
    ///
    /// The shortcuts only hold for the orbit of the origin, so they are skipped for any
    /// other `z0`. Non-finite inputs are not rejected: every comparison against NaN is
    /// false, so such points run out the iteration budget and come back as `Converges`.
    #[must_use]
    pub fn evaluate(&self, z0: Complex, c: Complex, max_iterations: u32) -> AnalysisResult {
        let mut recorder = Recorder::new(self.retention, max_iterations);
        recorder.push(z0, 0);

        if max_iterations == 0 {
            return AnalysisResult::Converges {
                sequence: recorder.finish(),
            };
        }

        if self.fast_paths && z0.is_origin() {
            if outside_bailout(c) {
                recorder.push(c, 1);
                return AnalysisResult::Diverges {
                    escape_time: 1,
                    sequence: recorder.finish(),
                };
            }

            if in_main_cardioid(c) || in_period2_bulb(c) {
                return AnalysisResult::Converges {
                    sequence: recorder.finish(),
                };
            }
        }

        let mut z = z0;
        let mut stored = z0;
        let mut window = 0;

        for iteration in 1..=max_iterations {
            z = z.square() + c;
            recorder.push(z, iteration);

            if z.magnitude_squared() > BAILOUT_RADIUS_SQUARED {
                return AnalysisResult::Diverges {
                    escape_time: iteration,
                    sequence: recorder.finish(),
                };
            }

            if self.cycle_check_interval > 0 {
                // Exact equality only fires on a genuine cycle.
                if z == stored {
                    break;
                }

                window += 1;
                if window >= self.cycle_check_interval {
                    window = 0;
                    stored = z;
                }
            }
        }

        AnalysisResult::Converges {
            sequence: recorder.finish(),
        }
    }
}

impl Default for EscapeTimeEvaluator {
    fn default() -> Self {
        Self::region(true, DEFAULT_CYCLE_CHECK_INTERVAL)
    }
}

/// `|c|² > 4`: the first iterate from the origin already lies outside the bailout radius.
#[must_use]
pub fn outside_bailout(c: Complex) -> bool {
    c.magnitude_squared() > BAILOUT_RADIUS_SQUARED
}

#[must_use]
pub fn in_main_cardioid(c: Complex) -> bool {
    let x = c.real - 0.25;
    let y2 = c.imag * c.imag;
    let q = x * x + y2;

    q * (q + x) <= 0.25 * y2
}

#[must_use]
pub fn in_period2_bulb(c: Complex) -> bool {
    let x = c.real + 1.0;

    x * x + c.imag * c.imag <= 0.0625
}

struct Recorder {
    retention: SequenceRetention,
    steps: Vec<SequenceStep>,
}

impl Recorder {
    fn new(retention: SequenceRetention, max_iterations: u32) -> Self {
        let capacity = match retention {
            SequenceRetention::Full => {
                (max_iterations as usize).saturating_add(1).min(MAX_SEQUENCE_PREALLOCATION)
            }
            SequenceRetention::FinalStep => 1,
        };

        Self {
            retention,
            steps: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    fn push(&mut self, z: Complex, iteration: u32) {
        let step = SequenceStep { z, iteration };

        match (self.retention, self.steps.last_mut()) {
            (SequenceRetention::FinalStep, Some(last)) => *last = step,
            _ => self.steps.push(step),
        }
    }

    fn finish(self) -> Vec<SequenceStep> {
        self.steps
    }
}
