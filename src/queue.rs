//! Immediate FIFO queue and the sleep/wake protocol built on its lock.
//!
//! Workers sleep on their own condition variable while holding this
//! queue's mutex, so every decision to sleep and every wakeup is ordered
//! by the same lock. Idle workers are tracked in an ordered set; a
//! submission wakes the lowest-numbered idle worker and removes it from
//! the set, so back-to-back submissions wake distinct workers.

use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::task::Task;

/// State guarded by the queue lock.
#[derive(Debug, Default)]
struct QueueState {
    tasks: VecDeque<Task>,
    idle: BTreeSet<usize>,
    closed: bool,
}

/// How a call to [`ImmediateQueue::wait`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The worker did not sleep: work was pending, the pool closed, or
    /// the timeout callback declined.
    Skipped,
    /// The worker slept and was signaled (or woke spuriously).
    Woken,
    /// The worker slept until its timeout elapsed.
    TimedOut,
}

/// Unbounded FIFO of immediate tasks plus per-worker wake signals.
#[derive(Debug)]
pub struct ImmediateQueue {
    state: Mutex<QueueState>,
    signals: Vec<Condvar>,
    closed: AtomicBool,
}

impl ImmediateQueue {
    /// Create a queue serving `workers` sleepers.
    pub fn new(workers: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            signals: (0..workers).map(|_| Condvar::new()).collect(),
            closed: AtomicBool::new(false),
        }
    }

    /// Append `task` and wake one idle worker.
    ///
    /// Hands the task back if the queue has been closed.
    pub fn push(&self, task: Task) -> Result<(), Task> {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(task);
        }
        state.tasks.push_back(task);
        self.wake_locked(&mut state);
        Ok(())
    }

    /// Pop the head task. Never blocks beyond lock contention.
    pub fn pop(&self) -> Option<Task> {
        self.state.lock().unwrap().tasks.pop_front()
    }

    /// Wake one idle worker, if any is asleep.
    pub fn wake_one(&self) {
        let mut state = self.state.lock().unwrap();
        self.wake_locked(&mut state);
    }

    fn wake_locked(&self, state: &mut QueueState) {
        if let Some(worker) = state.idle.pop_first() {
            self.signals[worker].notify_one();
        }
    }

    /// Put `worker` to sleep unless there is a reason not to.
    ///
    /// Under the lock the worker is kept awake if the queue is closed or
    /// non-empty. Otherwise `timeout` is consulted: `None` means do not
    /// sleep, `Some(d)` bounds the wait.
    pub fn wait<F>(&self, worker: usize, timeout: F) -> WaitOutcome
    where
        F: FnOnce() -> Option<Duration>,
    {
        let mut state = self.state.lock().unwrap();
        if state.closed || !state.tasks.is_empty() {
            return WaitOutcome::Skipped;
        }
        let Some(timeout) = timeout() else {
            return WaitOutcome::Skipped;
        };

        state.idle.insert(worker);
        let (mut state, result) = self.signals[worker]
            .wait_timeout(state, timeout)
            .unwrap();
        state.idle.remove(&worker);

        if result.timed_out() {
            WaitOutcome::TimedOut
        } else {
            WaitOutcome::Woken
        }
    }

    /// Refuse further pushes and wake every worker.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        self.closed.store(true, Ordering::SeqCst);
        state.idle.clear();
        for signal in &self.signals {
            signal.notify_all();
        }
    }

    /// Whether [`close`](Self::close) has been called.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Remove and return every queued task in FIFO order.
    pub fn take_remaining(&self) -> Vec<Task> {
        self.state.lock().unwrap().tasks.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of workers currently registered as idle.
    pub fn idle_count(&self) -> usize {
        self.state.lock().unwrap().idle.len()
    }
}
