//! taskqueue - fixed-size worker thread pool for immediate and delayed tasks.
//!
//! Immediate tasks run in submission order as soon as a worker is free.
//! Delayed tasks run no earlier than their deadline, ordered by deadline
//! and then by submission order. Idle workers block in timed waits and
//! are woken one at a time as work arrives; there is no timer thread.
//!
//! # Features
//!
//! - **FIFO immediate queue**: unbounded, one lock, total order across producers
//! - **Deadline index**: ordered by `(deadline, sequence)` under its own lock
//! - **Targeted wakeups**: a submission wakes exactly one idle worker
//! - **Explicit shutdown**: `destroy` joins all workers and hands back
//!   unexecuted immediate tasks
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use taskqueue::TaskQueue;
//!
//! let pool = TaskQueue::new(4)?;
//! pool.enqueue(|| println!("now"))?;
//! pool.schedule(Duration::from_millis(50), || println!("later"))?;
//!
//! std::thread::sleep(Duration::from_millis(100));
//! let unexecuted = pool.destroy();
//! assert!(unexecuted.is_empty());
//! # Ok::<(), taskqueue::PoolError>(())
//! ```
//!
//! Delay tasks still pending at shutdown are dropped without running.
//! Callers that need them call [`TaskQueue::take_delayed`] first.

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod clock;
pub mod config;
pub mod delay;
pub mod logging;
pub mod pool;
pub mod queue;
pub mod task;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::Config;
pub use pool::{Builder, Handle, PoolError, PoolResult, PoolStats, Rejected, TaskQueue};
pub use task::{DelayTask, Task};
