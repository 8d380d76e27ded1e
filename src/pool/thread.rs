//! Fixed-size worker thread pool with immediate and delayed tasks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::oneshot;

use super::error::{PoolResult, Rejected};
use super::worker;
use super::PoolStats;
use crate::clock::{Clock, MonotonicClock};
use crate::config::PoolConfig;
use crate::delay::DelayQueue;
use crate::queue::ImmediateQueue;
use crate::task::{DelayTask, Task};

/// Default upper bound on a single idle wait.
pub const DEFAULT_MAX_IDLE_WAIT: Duration = Duration::from_secs(3600);

/// Shortest idle wait a pool will use. Smaller ceilings are raised to this.
pub const MIN_IDLE_WAIT: Duration = Duration::from_millis(1);

/// Default pool name, used as the worker thread name prefix.
pub const DEFAULT_NAME: &str = "taskqueue";

/// Execution counters.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) tasks_run: AtomicU64,
    pub(crate) delayed_run: AtomicU64,
    pub(crate) panics: AtomicU64,
    pub(crate) idle_waits: AtomicU64,
}

/// State shared between the pool, its handles, and its workers.
pub(crate) struct Shared {
    pub(crate) name: String,
    pub(crate) worker_count: usize,
    pub(crate) queue: ImmediateQueue,
    pub(crate) delayed: DelayQueue,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) max_idle_wait: Duration,
    pub(crate) stats: Counters,
}

/// Configures and starts a [`TaskQueue`].
pub struct Builder {
    workers: usize,
    name: String,
    max_idle_wait: Duration,
    clock: Arc<dyn Clock>,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            workers: 1,
            name: DEFAULT_NAME.to_string(),
            max_idle_wait: DEFAULT_MAX_IDLE_WAIT,
            clock: Arc::new(MonotonicClock::new()),
        }
    }

    /// Number of worker threads. Zero is treated as one.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Pool name, used in logs and as the thread name prefix.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Longest time an idle worker sleeps without a known deadline.
    ///
    /// Values below [`MIN_IDLE_WAIT`] are raised to it.
    pub fn max_idle_wait(mut self, wait: Duration) -> Self {
        self.max_idle_wait = wait;
        self
    }

    /// Clock used to compute deadlines.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Spawn the workers and return the running pool.
    ///
    /// If any worker fails to start, the ones already running are stopped
    /// and joined before the error is returned.
    pub fn build(self) -> PoolResult<TaskQueue> {
        let worker_count = self.workers.max(1);

        let shared = Arc::new(Shared {
            name: self.name,
            worker_count,
            queue: ImmediateQueue::new(worker_count),
            delayed: DelayQueue::new(),
            clock: self.clock,
            max_idle_wait: self.max_idle_wait.max(MIN_IDLE_WAIT),
            stats: Counters::default(),
        });

        let mut workers = Vec::with_capacity(worker_count);

        for id in 0..worker_count {
            let worker_shared = Arc::clone(&shared);
            let spawned = thread::Builder::new()
                .name(format!("{}-{}", shared.name, id))
                .spawn(move || worker::run(&worker_shared, id));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    tracing::error!(pool = %shared.name, worker = id, error = %e, "failed to spawn worker");
                    shared.queue.close();
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(e.into());
                }
            }
        }

        tracing::info!(
            pool = %shared.name,
            workers = worker_count,
            max_idle_wait_ms = shared.max_idle_wait.as_millis() as u64,
            "task queue created"
        );

        Ok(TaskQueue {
            handle: Handle { shared },
            workers,
        })
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable submitter for a [`TaskQueue`].
///
/// Once the pool is destroyed every submission fails with
/// [`PoolError::InvalidHandle`](super::PoolError::InvalidHandle), or with
/// [`Rejected`] carrying the task back.
#[derive(Clone)]
pub struct Handle {
    shared: Arc<Shared>,
}

impl Handle {
    /// Queue a closure for immediate execution.
    pub fn enqueue<F>(&self, f: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        Ok(self.enqueue_task(Task::new(f))?)
    }

    /// Queue a task for immediate execution and wake one idle worker.
    ///
    /// A shut-down pool hands the task back inside the error.
    pub fn enqueue_task(&self, task: Task) -> Result<(), Rejected<Task>> {
        self.shared.queue.push(task).map_err(Rejected::new)
    }

    /// Run `f` on the pool and deliver its result through a oneshot channel.
    ///
    /// The receiver errors if the pool is destroyed before `f` runs.
    pub fn submit<F, R>(&self, f: F) -> PoolResult<oneshot::Receiver<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (response_tx, response_rx) = oneshot::channel();
        self.enqueue(move || {
            let _ = response_tx.send(f());
        })?;
        Ok(response_rx)
    }

    /// Run `f` no earlier than `delay` from now.
    ///
    /// Sub-millisecond precision is truncated.
    pub fn schedule<F>(&self, delay: Duration, f: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        Ok(self.schedule_task(DelayTask::new(f), delay_ms)?)
    }

    /// Run `f` no earlier than `delay_ms` milliseconds from now.
    pub fn schedule_ms<F>(&self, delay_ms: u64, f: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        Ok(self.schedule_task(DelayTask::new(f), delay_ms)?)
    }

    /// Index a delay task and wake one idle worker.
    ///
    /// A zero delay means "as soon as a worker next checks". A shut-down
    /// pool hands the task back inside the error.
    pub fn schedule_task(&self, task: DelayTask, delay_ms: u64) -> Result<(), Rejected<DelayTask>> {
        let shared = &self.shared;
        if shared.queue.is_closed() {
            return Err(Rejected::new(task));
        }
        let (deadline_ms, sequence) = shared.delayed.schedule(task, delay_ms, &*shared.clock);
        shared.queue.wake_one();

        tracing::trace!(pool = %shared.name, deadline_ms, sequence, "delay task scheduled");
        Ok(())
    }

    /// Remove and return every delay task still waiting for its deadline.
    ///
    /// Call before [`TaskQueue::destroy`] to account for delayed work,
    /// which is otherwise dropped unexecuted at shutdown.
    pub fn take_delayed(&self) -> Vec<DelayTask> {
        self.shared.delayed.take_all()
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        let shared = &self.shared;
        PoolStats {
            workers: shared.worker_count,
            executed_tasks: shared.stats.tasks_run.load(Ordering::Relaxed),
            executed_delayed: shared.stats.delayed_run.load(Ordering::Relaxed),
            panics: shared.stats.panics.load(Ordering::Relaxed),
            idle_waits: shared.stats.idle_waits.load(Ordering::Relaxed),
            pending_tasks: shared.queue.len(),
            pending_delayed: shared.delayed.len(),
        }
    }

    /// Whether the pool has been shut down.
    pub fn is_closed(&self) -> bool {
        self.shared.queue.is_closed()
    }

    /// Current time on the pool's clock, in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.shared.clock.now_ms()
    }
}

/// A fixed-size pool of worker threads running immediate and delayed tasks.
///
/// Dropping the pool shuts it down like [`destroy`](Self::destroy) but
/// discards the unexecuted tasks.
pub struct TaskQueue {
    handle: Handle,
    workers: Vec<JoinHandle<()>>,
}

impl TaskQueue {
    /// Start a pool with `workers` threads (zero is treated as one).
    pub fn new(workers: usize) -> PoolResult<Self> {
        Builder::new().workers(workers).build()
    }

    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Start a pool from loaded configuration.
    pub fn from_config(config: &PoolConfig) -> PoolResult<Self> {
        Builder::new()
            .workers(config.worker_count())
            .name(config.name.clone())
            .max_idle_wait(config.max_idle_wait)
            .build()
    }

    /// A cloneable submitter for this pool.
    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }

    pub fn enqueue<F>(&self, f: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.enqueue(f)
    }

    pub fn enqueue_task(&self, task: Task) -> Result<(), Rejected<Task>> {
        self.handle.enqueue_task(task)
    }

    pub fn submit<F, R>(&self, f: F) -> PoolResult<oneshot::Receiver<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.handle.submit(f)
    }

    pub fn schedule<F>(&self, delay: Duration, f: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.schedule(delay, f)
    }

    pub fn schedule_ms<F>(&self, delay_ms: u64, f: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.schedule_ms(delay_ms, f)
    }

    pub fn schedule_task(&self, task: DelayTask, delay_ms: u64) -> Result<(), Rejected<DelayTask>> {
        self.handle.schedule_task(task, delay_ms)
    }

    pub fn take_delayed(&self) -> Vec<DelayTask> {
        self.handle.take_delayed()
    }

    pub fn stats(&self) -> PoolStats {
        self.handle.stats()
    }

    /// Number of worker threads actually started.
    pub fn worker_count(&self) -> usize {
        self.handle.shared.worker_count
    }

    /// Get the pool name.
    pub fn name(&self) -> &str {
        &self.handle.shared.name
    }

    /// Stop all workers, join them, and return the immediate tasks that
    /// were never dequeued.
    ///
    /// Delay tasks still waiting for their deadline are dropped without
    /// running. Use [`take_delayed`](Self::take_delayed) first to keep them.
    pub fn destroy(mut self) -> Vec<Task> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Vec<Task> {
        if self.workers.is_empty() {
            return Vec::new();
        }
        let shared = &self.handle.shared;

        tracing::info!(pool = %shared.name, "shutting down task queue");
        shared.queue.close();

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::warn!(pool = %shared.name, "worker thread exited with a panic");
            }
        }

        let remaining = shared.queue.take_remaining();
        let dropped_delayed = shared.delayed.len();
        tracing::info!(
            pool = %shared.name,
            unexecuted_tasks = remaining.len(),
            dropped_delayed,
            "task queue stopped"
        );
        remaining
    }
}

impl Drop for TaskQueue {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
