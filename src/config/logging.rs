//! Logging configuration.

use super::parse::env_or;
use super::ConfigError;

/// Output format for log lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable tracing-subscriber output.
    Text,
}

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log level filter (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    /// Service name for structured logging.
    pub service_name: String,
    /// Output format (from LOG_FORMAT).
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default
    ///
    /// LOG_LEVEL accepts simple values: trace, debug, info, warn, error
    /// RUST_LOG accepts full tracing filter syntax: taskqueue=debug
    pub fn from_env() -> Result<Self, ConfigError> {
        let filter = Self::resolve_log_filter();
        let format = match env_or("LOG_FORMAT", "json").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "text" | "pretty" => LogFormat::Text,
            other => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT".into(),
                    message: format!("expected json or text, got '{}'", other),
                })
            }
        };
        Ok(Self {
            filter,
            service_name: env_or("SERVICE_NAME", "taskqueue"),
            format,
        })
    }

    /// Resolve log filter from environment.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default (info)
    fn resolve_log_filter() -> String {
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            let level = level.to_lowercase();
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    return format!("taskqueue={}", level);
                }
                _ => {
                    eprintln!(
                        "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                        level
                    );
                }
            }
        }

        if let Ok(filter) = std::env::var("RUST_LOG") {
            return filter;
        }

        "taskqueue=info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "taskqueue=info".to_string(),
            service_name: "taskqueue".to_string(),
            format: LogFormat::Json,
        }
    }
}
