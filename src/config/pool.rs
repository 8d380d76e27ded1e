//! Task queue pool configuration.

use super::parse::{env_duration, env_or, env_parse};
use super::ConfigError;
use crate::pool::{DEFAULT_MAX_IDLE_WAIT, DEFAULT_NAME};
use std::num::NonZeroUsize;
use std::time::Duration;

/// Pool configuration loaded from environment.
///
/// All values are pre-computed at construction time for zero-cost access.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Pool name, used as the worker thread name prefix.
    pub name: String,
    /// Longest idle wait when no deadline is known.
    pub max_idle_wait: Duration,
    /// Resolved worker count (never zero).
    worker_count: NonZeroUsize,
}

impl PoolConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            name: env_or("TASKQUEUE_NAME", DEFAULT_NAME),
            max_idle_wait: Self::parse_max_idle_wait()?,
            worker_count: Self::parse_worker_count()?,
        })
    }

    /// Build a configuration directly.
    pub fn new(name: impl Into<String>, workers: usize, max_idle_wait: Duration) -> Self {
        Self {
            name: name.into(),
            max_idle_wait,
            worker_count: Self::resolve_workers(workers),
        }
    }

    /// Get worker count (pre-computed, zero-cost).
    #[inline]
    pub fn worker_count(&self) -> usize {
        self.worker_count.get()
    }

    fn parse_worker_count() -> Result<NonZeroUsize, ConfigError> {
        let workers: usize = env_parse("TASKQUEUE_WORKERS", 0)?;
        Ok(Self::resolve_workers(workers))
    }

    /// Resolve 0 to CPU count.
    fn resolve_workers(workers: usize) -> NonZeroUsize {
        let count = if workers == 0 { num_cpus::get() } else { workers };
        NonZeroUsize::new(count).unwrap_or(NonZeroUsize::MIN)
    }

    fn parse_max_idle_wait() -> Result<Duration, ConfigError> {
        env_duration("TASKQUEUE_MAX_IDLE_WAIT", "1h")?.ok_or_else(|| ConfigError::Invalid {
            key: "TASKQUEUE_MAX_IDLE_WAIT".into(),
            message: "max idle wait cannot be disabled".into(),
        })
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(DEFAULT_NAME, 0, DEFAULT_MAX_IDLE_WAIT)
    }
}
