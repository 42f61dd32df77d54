/// Turns chunk settlements into the fractions reported to `on_progress`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressTracker {
    total: usize,
    settled: usize,
    granularity: f64,
    last_reported: f64,
}

impl ProgressTracker {
    /// `granularity` is the smallest step between two reports; zero reports every chunk.
    #[must_use]
    pub fn new(total: usize, granularity: f64) -> Self {
        Self {
            total,
            settled: 0,
            granularity,
            last_reported: 0.0,
        }
    }

    #[must_use]
    pub fn settled(&self) -> usize {
        self.settled
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.settled >= self.total
    }

    /// Records one settled chunk and returns the fraction to report, if any.
    /// The final chunk always reports exactly `1.0`.
    pub fn settle(&mut self) -> Option<f64> {
        if self.is_finished() {
            return None;
        }

        self.settled += 1;

        if self.is_finished() {
            self.last_reported = 1.0;
            return Some(1.0);
        }

        let fraction = self.settled as f64 / self.total as f64;
        if fraction - self.last_reported >= self.granularity {
            self.last_reported = fraction;
            Some(fraction)
        } else {
            None
        }
    }
}
