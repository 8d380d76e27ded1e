//! Deadline-ordered index of delayed work.
//!
//! Entries are keyed by `(deadline_ms, sequence)`. Sequence ids are
//! strictly increasing in insertion order, so no two keys ever compare
//! equal and tasks sharing a deadline run in the order they were scheduled.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::clock::Clock;
use crate::task::DelayTask;

/// Outcome of [`DelayQueue::pop_if_due`].
#[derive(Debug)]
pub enum PopResult {
    /// The minimum entry was due and has been removed from the index.
    Due(DelayTask),
    /// Nothing is due yet.
    Pending {
        /// Deadline of the current minimum, if any entry is indexed.
        next_deadline: Option<u64>,
        /// Index epoch observed under the same lock.
        epoch: u64,
    },
}

/// Ordered set of delay tasks. Not synchronized on its own.
#[derive(Debug, Default)]
pub struct DelayIndex {
    entries: BTreeMap<(u64, u64), DelayTask>,
    next_sequence: u64,
}

impl DelayIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp `task` with `deadline_ms` and the next sequence id, then index it.
    pub fn insert(&mut self, mut task: DelayTask, deadline_ms: u64) {
        task.deadline_ms = deadline_ms;
        task.sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.insert(task.key(), task);
    }

    /// Deadline of the minimum entry.
    #[inline]
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.keys().next().map(|&(deadline, _)| deadline)
    }

    /// Remove the minimum entry if its deadline is at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<DelayTask> {
        match self.next_deadline() {
            Some(deadline) if deadline <= now_ms => {
                self.entries.pop_first().map(|(_, task)| task)
            }
            _ => None,
        }
    }

    /// Remove every entry, in key order.
    pub fn drain(&mut self) -> Vec<DelayTask> {
        std::mem::take(&mut self.entries).into_values().collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// [`DelayIndex`] behind its own lock, plus an insertion epoch.
///
/// The epoch is bumped under the lock on every insert. Workers compare the
/// epoch seen while draining with the current one before going to sleep,
/// which catches inserts that landed between the drain and the sleep.
#[derive(Debug, Default)]
pub struct DelayQueue {
    index: Mutex<DelayIndex>,
    epoch: AtomicU64,
}

impl DelayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `task` with deadline `clock.now_ms() + delay_ms`.
    ///
    /// The clock is read under the index lock, so deadlines and sequence
    /// ids are assigned in the same order. Returns the assigned
    /// `(deadline_ms, sequence)` key.
    pub fn schedule(&self, task: DelayTask, delay_ms: u64, clock: &dyn Clock) -> (u64, u64) {
        let mut index = self.index.lock().unwrap();
        let deadline_ms = clock.now_ms().saturating_add(delay_ms);
        let sequence = index.next_sequence;
        index.insert(task, deadline_ms);
        self.epoch.fetch_add(1, Ordering::SeqCst);
        (deadline_ms, sequence)
    }

    /// Atomically peek the minimum entry and remove it if due.
    pub fn pop_if_due(&self, now_ms: u64) -> PopResult {
        let mut index = self.index.lock().unwrap();
        match index.pop_due(now_ms) {
            Some(task) => PopResult::Due(task),
            None => PopResult::Pending {
                next_deadline: index.next_deadline(),
                epoch: self.epoch.load(Ordering::SeqCst),
            },
        }
    }

    /// Current insertion epoch.
    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Remove and return all pending tasks in execution order.
    pub fn take_all(&self) -> Vec<DelayTask> {
        self.index.lock().unwrap().drain()
    }

    pub fn len(&self) -> usize {
        self.index.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
