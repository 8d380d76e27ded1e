//! Per-worker run loop.
//!
//! Each iteration runs at most one immediate task, drains every due delay
//! task, then sleeps until signaled or until the next known deadline. The
//! shutdown flag is checked before each step.
//!
//! The next deadline is cached from the last drain and may go stale if a
//! task with an earlier deadline is scheduled while this worker sleeps.
//! That schedule wakes one idle worker, which re-drains the index and
//! caches ground truth, so the earlier deadline is still honored as long
//! as some worker is awake or gets woken. A schedule that lands between
//! this worker's drain and its sleep is caught by the index epoch check.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::time::Duration;

use super::thread::Shared;
use crate::delay::PopResult;
use crate::queue::WaitOutcome;

/// Next deadline and index epoch observed at the end of a drain.
#[derive(Debug, Clone, Copy, Default)]
struct DeadlineCache {
    next_deadline: Option<u64>,
    epoch: u64,
}

/// Worker thread main loop.
pub(crate) fn run(shared: &Shared, id: usize) {
    tracing::debug!(pool = %shared.name, worker = id, "worker started");

    while !shared.queue.is_closed() {
        if let Some(task) = shared.queue.pop() {
            if shared.guard(id, || task.run()) {
                shared.stats.tasks_run.fetch_add(1, Ordering::Relaxed);
            }
        }

        if shared.queue.is_closed() {
            break;
        }
        let Some(cache) = drain_delayed(shared, id) else {
            break;
        };

        let outcome = shared.queue.wait(id, || {
            if shared.delayed.epoch() != cache.epoch {
                return None;
            }
            sleep_timeout(
                shared.clock.now_ms(),
                cache.next_deadline,
                shared.max_idle_wait,
            )
        });
        if outcome != WaitOutcome::Skipped {
            shared.stats.idle_waits.fetch_add(1, Ordering::Relaxed);
        }
    }

    tracing::debug!(pool = %shared.name, worker = id, "worker stopped");
}

/// Run every delay task whose deadline has passed.
///
/// Returns `None` if the pool closed while draining.
fn drain_delayed(shared: &Shared, id: usize) -> Option<DeadlineCache> {
    loop {
        if shared.queue.is_closed() {
            return None;
        }
        match shared.delayed.pop_if_due(shared.clock.now_ms()) {
            PopResult::Due(task) => {
                if shared.guard(id, || task.run()) {
                    shared.stats.delayed_run.fetch_add(1, Ordering::Relaxed);
                }
            }
            PopResult::Pending {
                next_deadline,
                epoch,
            } => {
                return Some(DeadlineCache {
                    next_deadline,
                    epoch,
                })
            }
        }
    }
}

/// How long an idle worker may sleep.
///
/// `None` means a deadline has already passed and the worker should loop
/// without sleeping. Waits are capped at `ceiling`.
pub(crate) fn sleep_timeout(
    now_ms: u64,
    next_deadline: Option<u64>,
    ceiling: Duration,
) -> Option<Duration> {
    match next_deadline {
        None => Some(ceiling),
        Some(deadline) if deadline > now_ms => {
            Some(Duration::from_millis(deadline - now_ms).min(ceiling))
        }
        Some(_) => None,
    }
}

impl Shared {
    /// Invoke `action`, containing any panic so the worker survives.
    ///
    /// Returns `true` if the action completed normally.
    fn guard<F: FnOnce()>(&self, id: usize, action: F) -> bool {
        match panic::catch_unwind(AssertUnwindSafe(action)) {
            Ok(()) => true,
            Err(payload) => {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                self.stats.panics.fetch_add(1, Ordering::Relaxed);
                tracing::error!(pool = %self.name, worker = id, panic = %msg, "task panicked");
                false
            }
        }
    }
}
