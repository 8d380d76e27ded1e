//! Worker pool running immediate and delayed tasks.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        TaskQueue                           │
//! ├────────────────────────────────────────────────────────────┤
//! │  enqueue()                        schedule()               │
//! │      │                                 │                   │
//! │  ┌───▼────────────┐          ┌─────────▼─────────┐         │
//! │  │ ImmediateQueue │          │    DelayQueue     │         │
//! │  │  (FIFO, lock)  │          │ (deadline, seq)   │         │
//! │  └───┬────────────┘          └─────────┬─────────┘         │
//! │      │    wake one idle worker         │                   │
//! │  ┌───▼────┐    ┌─────────┐    ┌────────▼┐                  │
//! │  │Worker 0│    │Worker 1 │    │Worker 2 │  ...             │
//! │  └────────┘    └─────────┘    └─────────┘                  │
//! │  run one task → drain due delay tasks → timed sleep        │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Workers never hold both locks at once. An idle worker sleeps on its
//! own condition variable until signaled or until the next deadline it
//! knows of, capped by the max idle wait (one hour by default).

mod error;
mod thread;
mod worker;

pub use error::{PoolError, PoolResult, Rejected};
pub use thread::{
    Builder, Handle, TaskQueue, DEFAULT_MAX_IDLE_WAIT, DEFAULT_NAME, MIN_IDLE_WAIT,
};

use serde::Serialize;

/// Snapshot of pool counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Worker threads started.
    pub workers: usize,
    /// Immediate tasks that ran to completion.
    pub executed_tasks: u64,
    /// Delay tasks that ran to completion.
    pub executed_delayed: u64,
    /// Actions of either kind that panicked.
    pub panics: u64,
    /// Timed waits entered by idle workers.
    pub idle_waits: u64,
    /// Immediate tasks waiting in the queue.
    pub pending_tasks: usize,
    /// Delay tasks waiting for their deadline.
    pub pending_delayed: usize,
}
