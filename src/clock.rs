//! Millisecond clock sources used to compute and compare deadlines.
//!
//! Deadlines are absolute `u64` millisecond timestamps. They are compared
//! directly (`<`, `==`, `>`), never through a narrowing subtraction.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Source of the current time in milliseconds.
pub trait Clock: Send + Sync {
    /// Current timestamp in milliseconds.
    fn now_ms(&self) -> u64;
}

/// Monotonic clock anchored at construction time.
///
/// Wall-clock steps (NTP adjustments, manual changes) do not move
/// deadlines, which makes this the default for pools.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    anchor: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            anchor: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now_ms(&self) -> u64 {
        u64::try_from(self.anchor.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading `start_ms`.
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    /// Set the current time.
    pub fn set(&self, now_ms: u64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    /// Move the clock forward by `delta_ms`, saturating at `u64::MAX`.
    pub fn advance(&self, delta_ms: u64) {
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(delta_ms))
            });
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
