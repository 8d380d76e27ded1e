//! Units of work accepted by the pool.
//!
//! Both entities own their action. Running one consumes it, so an action
//! can never be invoked twice.

use std::fmt;

type Action = Box<dyn FnOnce() + Send + 'static>;

/// A unit of immediate work, executed in submission order.
pub struct Task {
    action: Action,
}

impl Task {
    /// Wrap a closure as a task.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            action: Box::new(f),
        }
    }

    /// Invoke the action, consuming the task.
    pub fn run(self) {
        (self.action)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}

/// A unit of deferred work.
///
/// The deadline and sequence id are assigned by the pool when the task
/// is scheduled. Until then both read as zero.
pub struct DelayTask {
    action: Action,
    pub(crate) deadline_ms: u64,
    pub(crate) sequence: u64,
}

impl DelayTask {
    /// Wrap a closure as a delay task.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            action: Box::new(f),
            deadline_ms: 0,
            sequence: 0,
        }
    }

    /// Absolute deadline in milliseconds of the pool's clock.
    #[inline]
    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }

    /// Insertion sequence id, used to order tasks sharing a deadline.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Ordering key: deadline first, then sequence.
    #[inline]
    pub(crate) fn key(&self) -> (u64, u64) {
        (self.deadline_ms, self.sequence)
    }

    /// Invoke the action, consuming the task.
    pub fn run(self) {
        (self.action)()
    }
}

impl fmt::Debug for DelayTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayTask")
            .field("deadline_ms", &self.deadline_ms)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}
