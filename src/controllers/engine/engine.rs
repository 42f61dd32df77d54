use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::controllers::engine::config::EngineConfig;
use crate::controllers::engine::errors::EngineError;
use crate::controllers::engine::requests::{
    GridRequest, PointRequest, RegionRequest, validate_iterations,
};
use crate::controllers::region::ComputeScheduler;
use crate::controllers::region::data::job::{JobHandle, SchedulerState};
use crate::controllers::region::ports::RegionObserver;
use crate::core::actions::compute_chunk::ports::chunk_executor::ChunkExecutor;
use crate::core::cache::result_cache::{ResultCache, ResultSnapshot};
use crate::core::data::analysis_result::AnalysisResult;
use crate::core::data::complex::Complex;
use crate::core::data::coordinate_key::CoordinateKey;
use crate::core::fractals::mandelbrot::evaluator::EscapeTimeEvaluator;

/// What the cached results were computed for. Results from different sessions
/// are not comparable, so switching sessions clears the cache.
#[derive(Debug, Copy, Clone, PartialEq)]
enum Session {
    Grid { z0: Complex, max_iterations: u32 },
    Region { max_iterations: u32 },
}

/// Entry point for point, grid and region evaluation.
///
/// Input is validated here; nothing invalid reaches the scheduler.
pub struct Engine {
    config: EngineConfig,
    cache: ResultCache,
    scheduler: ComputeScheduler,
    orbit: EscapeTimeEvaluator,
    session: Mutex<Option<Session>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let executor = Arc::new(config.executor());
        Self::with_executor(config, executor)
    }

    /// Builds an engine whose region jobs run on a caller-supplied execution unit.
    pub fn with_executor(
        config: EngineConfig,
        executor: Arc<dyn ChunkExecutor>,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let cache = ResultCache::new();
        let scheduler = ComputeScheduler::new(executor, cache.clone(), config.scheduler_options()?)?;

        info!(workers = config.workers, ordering = ?config.ordering, "engine ready");

        Ok(Self {
            config,
            cache,
            scheduler,
            orbit: EscapeTimeEvaluator::orbit(),
            session: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Iterates a single point, keeping every step of the orbit.
    pub fn evaluate_point(&self, request: PointRequest) -> Result<AnalysisResult, EngineError> {
        let max_iterations = validate_iterations(request.max_iterations)?;

        Ok(self.orbit.evaluate(request.z0, request.c, max_iterations))
    }

    /// Iterates every point of a square grid, keyed by its parameter `c`.
    ///
    /// Results are also merged into the cache under a grid session.
    pub fn evaluate_grid(
        &self,
        request: &GridRequest,
    ) -> Result<HashMap<CoordinateKey, AnalysisResult>, EngineError> {
        let (size, max_iterations) = request.validate()?;

        self.begin_session(Session::Grid {
            z0: request.z0,
            max_iterations,
        });

        let results: HashMap<CoordinateKey, AnalysisResult> = request
            .points(size)
            .into_par_iter()
            .map(|c| {
                let result = self.orbit.evaluate(request.z0, c, max_iterations);
                (CoordinateKey::from(c), result)
            })
            .collect();

        self.cache
            .merge(results.iter().map(|(key, result)| (key.clone(), result.clone())));
        debug!(size, points = results.len(), "grid evaluated");

        Ok(results)
    }

    /// Starts an asynchronous region job, superseding any job still running.
    ///
    /// Errors are returned synchronously and no job is started; job failures
    /// arrive through [`RegionObserver::on_complete`].
    pub fn compute_region(
        &self,
        request: RegionRequest,
        observer: Arc<dyn RegionObserver>,
    ) -> Result<JobHandle, EngineError> {
        let job = request.validate()?;

        self.begin_session(Session::Region {
            max_iterations: job.max_iterations,
        });

        Ok(self.scheduler.start_region_job(job, observer))
    }

    pub fn cancel(&self, handle: JobHandle) -> bool {
        self.scheduler.cancel(handle)
    }

    /// Copy of every cached result.
    #[must_use]
    pub fn snapshot(&self) -> ResultSnapshot {
        self.cache.snapshot()
    }

    #[must_use]
    pub fn cached_result(&self, key: &CoordinateKey) -> Option<AnalysisResult> {
        self.cache.get(key)
    }

    /// Cancels any live job and drops every cached result.
    pub fn clear_cache(&self) {
        *self.lock_session() = None;
        self.scheduler.cancel_current();
        self.cache.clear();
        info!("result cache cleared");
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    #[must_use]
    pub fn last_completed_generation(&self) -> u64 {
        self.scheduler.last_completed_generation()
    }

    fn begin_session(&self, next: Session) {
        // Not held across scheduler calls: an observer callback may re-enter the engine.
        let changed = {
            let mut session = self.lock_session();
            let changed = session.is_some_and(|current| current != next);
            *session = Some(next);
            changed
        };

        if changed {
            self.scheduler.cancel_current();
            self.cache.clear();
            debug!(?next, "session changed, result cache cleared");
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, Instant};

    use crate::controllers::region::data::job::JobSummary;
    use crate::controllers::region::errors::job::JobError;

    #[derive(Default)]
    struct MockObserver {
        progress: Mutex<Vec<f64>>,
        outcome: Mutex<Option<Result<JobSummary, JobError>>>,
    }

    impl RegionObserver for MockObserver {
        fn on_progress(&self, fraction: f64) {
            self.progress.lock().unwrap().push(fraction);
        }

        fn on_complete(&self, outcome: Result<JobSummary, JobError>) {
            *self.outcome.lock().unwrap() = Some(outcome);
        }
    }

    fn wait_for_outcome(observer: &MockObserver, timeout: Duration) -> Result<JobSummary, JobError> {
        let start = Instant::now();
        loop {
            if let Some(outcome) = observer.outcome.lock().unwrap().clone() {
                return outcome;
            }
            assert!(start.elapsed() < timeout, "region job did not complete in time");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn engine() -> Engine {
        Engine::new(EngineConfig {
            chunk_capacity: (8, 8),
            workers: 2,
            ..EngineConfig::default()
        })
        .unwrap()
    }

    fn point(c: Complex, max_iterations: i64) -> PointRequest {
        PointRequest {
            z0: Complex::ZERO,
            c,
            max_iterations,
        }
    }

    fn region(max_iterations: i64) -> RegionRequest {
        RegionRequest {
            x_range: (-2.0, 0.5),
            y_range: (-1.25, 1.25),
            resolution: (20, 16),
            max_iterations,
        }
    }

    fn run_region(engine: &Engine, request: RegionRequest) -> (Arc<MockObserver>, Result<JobSummary, JobError>) {
        let observer = Arc::new(MockObserver::default());
        engine
            .compute_region(request, Arc::clone(&observer) as Arc<dyn RegionObserver>)
            .unwrap();
        let outcome = wait_for_outcome(&observer, Duration::from_secs(5));
        (observer, outcome)
    }

    #[test]
    fn test_points_outside_radius_two_escape_at_one() {
        let engine = engine();

        for c in [Complex::new(2.0, 1.0), Complex::new(-3.0, 0.0), Complex::new(0.5, -2.5)] {
            let result = engine.evaluate_point(point(c, 100)).unwrap();
            assert_eq!(result.escape_time(), Some(1), "{c}");
        }
    }

    #[test]
    fn test_origin_converges_for_any_bound() {
        let engine = engine();

        for max_iterations in [0, 1, 100, 1000] {
            let result = engine.evaluate_point(point(Complex::ZERO, max_iterations)).unwrap();
            assert!(result.converges());
        }
    }

    #[test]
    fn test_period_two_point_keeps_full_orbit() {
        let engine = engine();

        let result = engine.evaluate_point(point(Complex::new(-1.0, 0.0), 50)).unwrap();

        assert!(result.converges());
        assert_eq!(result.sequence().len(), 51);
        assert_eq!(result.sequence()[2].z, Complex::new(0.0, 0.0));
    }

    #[test]
    fn test_escaping_point_stays_within_cap() {
        let engine = engine();
        let c = Complex::new(0.4, 0.3);

        for max_iterations in [15, 50, 200] {
            let result = engine.evaluate_point(point(c, max_iterations)).unwrap();
            assert_eq!(result.escape_time(), Some(15));
        }
        assert!(engine.evaluate_point(point(c, 14)).unwrap().converges());
    }

    #[test]
    fn test_negative_iteration_bound_is_rejected() {
        let engine = engine();

        assert_eq!(
            engine.evaluate_point(point(Complex::ZERO, -1)),
            Err(EngineError::InvalidIterationBound(-1))
        );
    }

    #[test]
    fn test_grid_yields_nine_keys_around_center() {
        let engine = engine();
        let request = GridRequest {
            center: Complex::ZERO,
            size: 3,
            spacing: 1.0,
            z0: Complex::ZERO,
            max_iterations: 100,
        };

        let results = engine.evaluate_grid(&request).unwrap();

        assert_eq!(results.len(), 9);
        for real in [-1.0, 0.0, 1.0] {
            for imag in [-1.0, 0.0, 1.0] {
                let key = CoordinateKey::from(Complex::new(real, imag));
                assert!(results.contains_key(&key), "missing {key}");
            }
        }
        assert!(results[&CoordinateKey::from(Complex::ZERO)].converges());
        assert_eq!(engine.snapshot().len(), 9);
    }

    #[test]
    fn test_invalid_grid_size_starts_nothing() {
        let engine = engine();
        let request = GridRequest {
            center: Complex::ZERO,
            size: 4,
            spacing: 1.0,
            z0: Complex::ZERO,
            max_iterations: 100,
        };

        assert_eq!(engine.evaluate_grid(&request), Err(EngineError::InvalidGridSize(4)));
        assert!(engine.snapshot().is_empty());
    }

    #[test]
    fn test_invalid_region_is_rejected_synchronously() {
        let engine = engine();
        let observer = Arc::new(MockObserver::default());

        let result = engine.compute_region(
            RegionRequest {
                resolution: (-4, 10),
                ..region(50)
            },
            Arc::clone(&observer) as Arc<dyn RegionObserver>,
        );

        assert_eq!(result, Err(EngineError::InvalidResolution { x: -4, y: 10 }));
        assert_eq!(engine.state(), SchedulerState::Idle);
        assert!(observer.progress.lock().unwrap().is_empty());
    }

    #[test]
    fn test_region_job_fills_snapshot() {
        let engine = engine();

        let (observer, outcome) = run_region(&engine, region(60));
        let summary = outcome.unwrap();

        assert_eq!(summary.total_chunks, 6);
        assert_eq!(engine.snapshot().len(), 320);
        assert_eq!(observer.progress.lock().unwrap().last(), Some(&1.0));
        assert_eq!(engine.state(), SchedulerState::Completed);
        assert_eq!(engine.last_completed_generation(), summary.generation);

        let inside = CoordinateKey::from(Complex::new(-2.0, -1.25));
        assert!(engine.cached_result(&inside).is_some());
    }

    #[test]
    fn test_repeated_region_is_idempotent() {
        let engine = engine();

        let (_, first) = run_region(&engine, region(60));
        let before = engine.snapshot();
        let (_, second) = run_region(&engine, region(60));

        assert_eq!(first.unwrap().computed_chunks, 6);
        let second = second.unwrap();
        assert_eq!(second.computed_chunks, 0);
        assert_eq!(second.cached_chunks, 6);
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_changing_iteration_cap_resets_cache() {
        let engine = engine();

        run_region(&engine, region(60)).1.unwrap();
        let summary = run_region(&engine, region(80)).1.unwrap();

        assert_eq!(summary.cached_chunks, 0);
        assert_eq!(summary.computed_chunks, 6);
        assert_eq!(engine.snapshot().len(), 320);
    }

    #[test]
    fn test_grid_after_region_starts_a_new_session() {
        let engine = engine();
        run_region(&engine, region(60)).1.unwrap();

        let request = GridRequest {
            center: Complex::new(-0.5, 0.0),
            size: 5,
            spacing: 0.1,
            z0: Complex::ZERO,
            max_iterations: 60,
        };
        engine.evaluate_grid(&request).unwrap();

        assert_eq!(engine.snapshot().len(), 25);
    }

    #[test]
    fn test_clear_cache_empties_snapshot() {
        let engine = engine();
        run_region(&engine, region(40)).1.unwrap();

        engine.clear_cache();

        assert!(engine.snapshot().is_empty());
        let summary = run_region(&engine, region(40)).1.unwrap();
        assert_eq!(summary.cached_chunks, 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = Engine::new(EngineConfig {
            batch_rows: 0,
            ..EngineConfig::default()
        });

        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }
}
