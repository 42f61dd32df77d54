use crate::controllers::region::data::job::JobSummary;
use crate::controllers::region::errors::job::JobError;
use crate::core::data::analysis_result::AnalysisResult;
use crate::core::data::coordinate_key::CoordinateKey;

/// Receives the outcome of one region job.
///
/// Calls arrive on the scheduler's dispatcher thread, never after the job has been
/// cancelled or superseded. Implementations may call back into the engine (for
/// example to cancel) but should return promptly.
pub trait RegionObserver: Send + Sync {
    /// Fraction of chunks settled so far; non-decreasing, `1.0` only once every chunk is in.
    fn on_progress(&self, fraction: f64);

    /// Fires exactly once per job that is not cancelled.
    fn on_complete(&self, outcome: Result<JobSummary, JobError>);

    /// Points merged into the cache, batch by batch.
    fn on_points(&self, _points: &[(CoordinateKey, AnalysisResult)]) {}
}

/// Adapts a pair of closures into a [`RegionObserver`].
pub struct CallbackObserver<P, C> {
    on_progress: P,
    on_complete: C,
}

impl<P, C> CallbackObserver<P, C>
where
    P: Fn(f64) + Send + Sync,
    C: Fn(Result<JobSummary, JobError>) + Send + Sync,
{
    pub fn new(on_progress: P, on_complete: C) -> Self {
        Self {
            on_progress,
            on_complete,
        }
    }
}

impl<P, C> RegionObserver for CallbackObserver<P, C>
where
    P: Fn(f64) + Send + Sync,
    C: Fn(Result<JobSummary, JobError>) + Send + Sync,
{
    fn on_progress(&self, fraction: f64) {
        (self.on_progress)(fraction)
    }

    fn on_complete(&self, outcome: Result<JobSummary, JobError>) {
        (self.on_complete)(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_callback_observer_forwards_calls() {
        let progress = Mutex::new(Vec::new());
        let completed = Mutex::new(0);
        let observer = CallbackObserver::new(
            |fraction| progress.lock().unwrap().push(fraction),
            |outcome: Result<JobSummary, JobError>| {
                assert!(outcome.is_err());
                *completed.lock().unwrap() += 1;
            },
        );

        observer.on_progress(0.5);
        observer.on_points(&[]);
        observer.on_complete(Err(JobError::SchedulerShutDown));

        assert_eq!(*progress.lock().unwrap(), vec![0.5]);
        assert_eq!(*completed.lock().unwrap(), 1);
    }
}
