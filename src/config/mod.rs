//! Configuration module for taskqueue.
//!
//! This module provides centralized configuration loading from environment variables.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `TASKQUEUE_WORKERS` | `0` | Worker threads, `0` = CPU count |
//! | `TASKQUEUE_NAME` | `taskqueue` | Pool name and thread name prefix |
//! | `TASKQUEUE_MAX_IDLE_WAIT` | `1h` | Longest idle sleep with no deadline |
//! | `LOG_LEVEL` / `RUST_LOG` | `taskqueue=info` | Log filter |
//! | `LOG_FORMAT` | `json` | `json` or `text` |
//! | `SERVICE_NAME` | `taskqueue` | Service name in JSON logs |
//!
//! # Example
//!
//! ```rust,ignore
//! use taskqueue::{Config, TaskQueue};
//!
//! let config = Config::from_env()?;
//! let pool = TaskQueue::from_config(&config.pool)?;
//! ```

mod error;
mod logging;
mod parse;
mod pool;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use parse::parse_duration;
pub use pool::PoolConfig;

/// Complete application configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Pool configuration.
    pub pool: PoolConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            pool: PoolConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Pool: {}", self.pool.name);
        info!("  Workers: {}", self.pool.worker_count());
        info!("  Max idle wait: {}ms", self.pool.max_idle_wait.as_millis());
        info!("  Log filter: {}", self.logging.filter);
        info!("  Log format: {:?}", self.logging.format);
    }
}
