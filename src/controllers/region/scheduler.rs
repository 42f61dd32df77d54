use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use tracing::{debug, debug_span, error, info, info_span, warn};

use crate::controllers::region::data::job::{JobHandle, JobSummary, RegionJobRequest, SchedulerState};
use crate::controllers::region::data::progress::ProgressTracker;
use crate::controllers::region::errors::job::{JobError, SchedulerError};
use crate::controllers::region::events::worker_message::WorkerMessage;
use crate::controllers::region::ports::region_observer::RegionObserver;
use crate::core::actions::cancellation::{CancelToken, GenerationToken};
use crate::core::actions::compute_chunk::errors::ChunkExecutionError;
use crate::core::actions::compute_chunk::ports::chunk_executor::ChunkExecutor;
use crate::core::actions::plan_chunks::plan_chunks::ChunkPlanner;
use crate::core::cache::result_cache::ResultCache;
use crate::core::data::chunk::Chunk;

/// A chunk is attempted at most this many times before its job is aborted.
pub(crate) const MAX_CHUNK_ATTEMPTS: u32 = 2;

const DISPATCH_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SchedulerOptions {
    pub workers: usize,
    pub planner: ChunkPlanner,
    pub progress_granularity: f64,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism().map_or(1, usize::from),
            planner: ChunkPlanner::default(),
            progress_granularity: 0.0,
        }
    }
}

struct PendingJob {
    generation: u64,
    request: RegionJobRequest,
    observer: Arc<dyn RegionObserver>,
}

struct SharedState {
    generation: Arc<AtomicU64>,
    last_completed_generation: AtomicU64,
    latest_request: Mutex<Option<PendingJob>>,
    wake: Condvar,
    shutdown: AtomicBool,
    state: Mutex<SchedulerState>,
    // Held while an observer callback runs and while the job generation changes.
    callback_gate: Mutex<()>,
    dispatcher_thread: OnceLock<ThreadId>,
}

impl SharedState {
    fn lock_request(&self) -> MutexGuard<'_, Option<PendingJob>> {
        self.latest_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_gate(&self) -> MutexGuard<'_, ()> {
        self.callback_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Gate for calls coming from outside. A call made from inside an observer
    /// callback already runs under the gate on the dispatcher thread.
    fn enter_gate(&self) -> Option<MutexGuard<'_, ()>> {
        if self.dispatcher_thread.get() == Some(&thread::current().id()) {
            None
        } else {
            Some(self.lock_gate())
        }
    }

    fn state(&self) -> SchedulerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: SchedulerState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn is_current(&self, generation: u64) -> bool {
        !self.shutdown.load(Ordering::Acquire)
            && self.generation.load(Ordering::SeqCst) == generation
    }

    /// Runs `f` under the gate if `generation` is still the live job.
    fn if_current<R>(&self, generation: u64, f: impl FnOnce() -> R) -> Option<R> {
        let _gate = self.lock_gate();

        if self.is_current(generation) {
            Some(f())
        } else {
            None
        }
    }
}

/// Cancelled when the job is superseded or when its dispatcher stops listening.
#[derive(Debug, Clone)]
struct JobToken {
    generation: GenerationToken,
    aborted: Arc<AtomicBool>,
}

impl CancelToken for JobToken {
    fn is_cancelled(&self) -> bool {
        self.aborted.load(Ordering::Relaxed) || self.generation.is_cancelled()
    }
}

struct AbortOnDrop(Arc<AtomicBool>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Runs at most one region job at a time.
///
/// Jobs are planned into chunks and handed to a [`ChunkExecutor`] on a dedicated
/// rayon pool. Results flow back over a channel to a single dispatcher thread,
/// which merges them into the [`ResultCache`] and drives the observer. Starting a
/// job supersedes the previous one; results that arrive for a superseded or
/// cancelled job are dropped on receipt.
pub struct ComputeScheduler {
    shared: Arc<SharedState>,
    worker: Option<JoinHandle<()>>,
}

impl ComputeScheduler {
    pub fn new(
        executor: Arc<dyn ChunkExecutor>,
        cache: ResultCache,
        options: SchedulerOptions,
    ) -> Result<Self, SchedulerError> {
        let shared = Arc::new(SharedState {
            generation: Arc::new(AtomicU64::new(0)),
            last_completed_generation: AtomicU64::new(0),
            latest_request: Mutex::new(None),
            wake: Condvar::new(),
            shutdown: AtomicBool::new(false),
            state: Mutex::new(SchedulerState::Idle),
            callback_gate: Mutex::new(()),
            dispatcher_thread: OnceLock::new(),
        });

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers.max(1))
            .thread_name(|index| format!("mandelbrot-chunk-{index}"))
            .build()?;

        let dispatcher = Dispatcher {
            shared: Arc::clone(&shared),
            executor,
            cache,
            pool,
            planner: options.planner,
            progress_granularity: options.progress_granularity,
        };

        let worker = thread::Builder::new()
            .name("mandelbrot-dispatch".to_owned())
            .spawn(move || dispatcher.run())?;

        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Supersedes any live job and queues `request`. Returns immediately.
    ///
    /// After [`shutdown`](Self::shutdown) the observer is told
    /// [`JobError::SchedulerShutDown`] straight away.
    pub fn start_region_job(
        &self,
        request: RegionJobRequest,
        observer: Arc<dyn RegionObserver>,
    ) -> JobHandle {
        let gate = self.shared.enter_gate();

        if self.shared.shutdown.load(Ordering::Acquire) {
            drop(gate);
            observer.on_complete(Err(JobError::SchedulerShutDown));
            return JobHandle::new(self.shared.generation.load(Ordering::SeqCst));
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut guard = self.shared.lock_request();
            *guard = Some(PendingJob {
                generation,
                request,
                observer,
            });
        }

        self.shared.set_state(SchedulerState::Planning);
        self.shared.wake.notify_one();

        info!(
            generation,
            resolution = %request.resolution,
            max_iterations = request.max_iterations,
            "region job submitted"
        );

        JobHandle::new(generation)
    }

    /// Cancels the job behind `handle` if it is still live. Once this returns no
    /// further callback for that job will start.
    pub fn cancel(&self, handle: JobHandle) -> bool {
        let _gate = self.shared.enter_gate();
        let generation = handle.generation();

        if !matches!(
            self.shared.state(),
            SchedulerState::Planning | SchedulerState::Running
        ) {
            return false;
        }

        if self
            .shared
            .generation
            .compare_exchange(generation, generation + 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        {
            let mut guard = self.shared.lock_request();
            if guard.as_ref().is_some_and(|job| job.generation == generation) {
                *guard = None;
            }
        }

        self.shared.set_state(SchedulerState::Cancelled);
        info!(generation, "region job cancelled");

        true
    }

    /// Cancels whatever job is live, if any.
    pub fn cancel_current(&self) -> bool {
        let generation = self.shared.generation.load(Ordering::SeqCst);
        generation != 0 && self.cancel(JobHandle::new(generation))
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.shared.state()
    }

    #[must_use]
    pub fn current_generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    /// Generation of the last job that reached `on_complete`, successfully or not.
    #[must_use]
    pub fn last_completed_generation(&self) -> u64 {
        self.shared
            .last_completed_generation
            .load(Ordering::Acquire)
    }

    pub fn shutdown(&mut self) {
        {
            let _gate = self.shared.enter_gate();
            let _request = self.shared.lock_request();
            self.shared.shutdown.store(true, Ordering::Release);
            self.shared.generation.fetch_add(1, Ordering::SeqCst);
        }

        self.shared.wake.notify_one();

        if let Some(handle) = self.worker.take() {
            // Dropping the last handle from inside a callback must not join itself.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for ComputeScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Dispatcher {
    shared: Arc<SharedState>,
    executor: Arc<dyn ChunkExecutor>,
    cache: ResultCache,
    pool: rayon::ThreadPool,
    planner: ChunkPlanner,
    progress_granularity: f64,
}

impl Dispatcher {
    fn run(self) {
        let _ = self.shared.dispatcher_thread.set(thread::current().id());

        loop {
            let job = {
                let mut guard = self.shared.lock_request();
                loop {
                    if self.shared.shutdown.load(Ordering::Acquire) {
                        return;
                    }

                    if let Some(job) = guard.take() {
                        break job;
                    }

                    guard = self
                        .shared
                        .wake
                        .wait(guard)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            };

            let generation = job.generation;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_job(job)));

            if let Err(payload) = outcome {
                error!(
                    generation,
                    panic = %panic_message(payload.as_ref()),
                    "region job aborted by a panic"
                );
                self.shared.if_current(generation, || {
                    self.shared.set_state(SchedulerState::Failed);
                    self.shared
                        .last_completed_generation
                        .store(generation, Ordering::Release);
                });
            }
        }
    }

    fn run_job(&self, job: PendingJob) {
        let PendingJob {
            generation,
            request,
            observer,
        } = job;

        let span = info_span!("region_job", generation);
        let _entered = span.enter();

        let chunks = self
            .planner
            .plan(request.region, request.resolution, request.max_iterations);
        let total = chunks.len();

        let started = self.shared.if_current(generation, || {
            self.shared.set_state(SchedulerState::Running);
            observer.on_progress(0.0);
        });
        if started.is_none() {
            debug!("superseded before dispatch");
            return;
        }

        info!(chunks = total, "region job running");

        let abort = AbortOnDrop(Arc::new(AtomicBool::new(false)));
        let token = JobToken {
            generation: GenerationToken::new(generation, Arc::clone(&self.shared.generation)),
            aborted: Arc::clone(&abort.0),
        };

        let mut progress = ProgressTracker::new(total, self.progress_granularity);
        let mut summary = JobSummary {
            generation,
            total_chunks: total,
            ..JobSummary::default()
        };
        let mut pending = VecDeque::with_capacity(total);

        for (index, chunk) in chunks.iter().enumerate() {
            if self.cache.contains_chunk(&chunk.key()) {
                summary.cached_chunks += 1;
                let fraction = progress.settle();
                let reported = self.shared.if_current(generation, || {
                    if let Some(fraction) = fraction {
                        observer.on_progress(fraction);
                    }
                });
                if reported.is_none() {
                    return;
                }
            } else {
                pending.push_back(index);
            }
        }

        if summary.cached_chunks > 0 {
            debug!(cached = summary.cached_chunks, "chunks served from cache");
        }

        let (sender, receiver) = mpsc::channel();
        let window = self.pool.current_num_threads().max(1);
        let mut attempts = vec![0u32; total];
        let mut in_flight = 0usize;

        loop {
            if token.is_cancelled() {
                debug!("region job no longer current");
                return;
            }

            while in_flight < window {
                let Some(index) = pending.pop_front() else {
                    break;
                };

                attempts[index] += 1;
                self.dispatch(generation, index, &chunks[index], &token, &sender);
                in_flight += 1;
            }

            if in_flight == 0 {
                break;
            }

            // The dispatcher keeps its own sender, so the only error here is a timeout.
            let Ok(message) = receiver.recv_timeout(DISPATCH_POLL_INTERVAL) else {
                continue;
            };

            if message.generation() != generation {
                continue;
            }

            match message {
                WorkerMessage::Batch {
                    chunk_index, points, ..
                } => {
                    let count = points.len() as u64;
                    let merged = self.shared.if_current(generation, || {
                        self.cache.merge(points.iter().cloned());
                        observer.on_points(&points);
                    });
                    if merged.is_none() {
                        return;
                    }
                    summary.points += count;
                    debug!(chunk_index, points = count, "batch merged");
                }
                WorkerMessage::Finished { chunk_index, .. } => {
                    in_flight -= 1;
                    summary.computed_chunks += 1;
                    if attempts[chunk_index] > 1 {
                        summary.retried_chunks += 1;
                    }

                    let key = chunks[chunk_index].key();
                    let fraction = progress.settle();
                    let reported = self.shared.if_current(generation, || {
                        self.cache.mark_chunk_complete(key);
                        if let Some(fraction) = fraction {
                            observer.on_progress(fraction);
                        }
                    });
                    if reported.is_none() {
                        return;
                    }

                    debug!(chunk_index, settled = progress.settled(), total, "chunk settled");
                }
                WorkerMessage::Failed {
                    chunk_index, error, ..
                } => {
                    in_flight -= 1;

                    // A unit that stops on its own while the job is live is a failure.
                    if error.is_cancelled() && token.is_cancelled() {
                        continue;
                    }

                    if attempts[chunk_index] < MAX_CHUNK_ATTEMPTS {
                        warn!(chunk_index, %error, "chunk failed, retrying");
                        pending.push_front(chunk_index);
                        continue;
                    }

                    error!(
                        chunk_index,
                        attempts = attempts[chunk_index],
                        %error,
                        "chunk failed again, aborting region job"
                    );

                    let outcome = JobError::ChunkFailed {
                        chunk_index,
                        attempts: attempts[chunk_index],
                        reason: error,
                    };
                    self.shared.if_current(generation, || {
                        self.shared.set_state(SchedulerState::Failed);
                        self.shared
                            .last_completed_generation
                            .store(generation, Ordering::Release);
                        observer.on_complete(Err(outcome));
                    });
                    return;
                }
            }
        }

        let completed = self.shared.if_current(generation, || {
            self.shared.set_state(SchedulerState::Completed);
            self.shared
                .last_completed_generation
                .store(generation, Ordering::Release);
            observer.on_complete(Ok(summary));
        });

        if completed.is_some() {
            info!(
                computed = summary.computed_chunks,
                cached = summary.cached_chunks,
                retried = summary.retried_chunks,
                points = summary.points,
                "region job complete"
            );
        }
    }

    fn dispatch(
        &self,
        generation: u64,
        chunk_index: usize,
        chunk: &Chunk,
        token: &JobToken,
        sender: &Sender<WorkerMessage>,
    ) {
        let executor = Arc::clone(&self.executor);
        let chunk = chunk.clone();
        let token = token.clone();
        let sender = sender.clone();

        self.pool.spawn(move || {
            let span = debug_span!("chunk", generation, chunk_index);
            let _entered = span.enter();

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                executor.execute(&chunk, &token, &mut |points| {
                    let _ = sender.send(WorkerMessage::Batch {
                        generation,
                        chunk_index,
                        points,
                    });
                })
            }));

            let message = match outcome {
                Ok(Ok(())) => WorkerMessage::Finished {
                    generation,
                    chunk_index,
                },
                Ok(Err(error)) => WorkerMessage::Failed {
                    generation,
                    chunk_index,
                    error,
                },
                Err(payload) => WorkerMessage::Failed {
                    generation,
                    chunk_index,
                    error: ChunkExecutionError::Panicked(panic_message(payload.as_ref())),
                },
            };

            // The receiver is gone once the job is over; late messages are dropped.
            let _ = sender.send(message);
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_owned())
}
