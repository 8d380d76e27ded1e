//! Task queue error types.

use std::fmt;

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The pool behind this handle has been destroyed.
    InvalidHandle,

    /// A worker thread could not be started.
    Spawn(String),
}

impl PoolError {
    /// Check if this is an invalid handle error.
    pub fn is_invalid_handle(&self) -> bool {
        matches!(self, PoolError::InvalidHandle)
    }

    /// Check if this is a spawn error.
    pub fn is_spawn(&self) -> bool {
        matches!(self, PoolError::Spawn(_))
    }

    /// Get the error message for logging.
    pub fn message(&self) -> &str {
        match self {
            PoolError::InvalidHandle => "Invalid handle",
            PoolError::Spawn(_) => "Worker spawn failed",
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::InvalidHandle => {
                write!(f, "task queue has been shut down")
            }
            PoolError::Spawn(msg) => {
                write!(f, "failed to spawn worker thread: {}", msg)
            }
        }
    }
}

impl std::error::Error for PoolError {}

impl From<std::io::Error> for PoolError {
    fn from(err: std::io::Error) -> Self {
        PoolError::Spawn(err.to_string())
    }
}

/// A task refused by a shut-down pool, handed back to the caller.
pub struct Rejected<T> {
    task: T,
}

impl<T> Rejected<T> {
    pub(crate) fn new(task: T) -> Self {
        Self { task }
    }

    /// Recover the refused task.
    pub fn into_inner(self) -> T {
        self.task
    }
}

impl<T> fmt::Debug for Rejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected").finish_non_exhaustive()
    }
}

impl<T> fmt::Display for Rejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&PoolError::InvalidHandle, f)
    }
}

impl<T> std::error::Error for Rejected<T> {}

impl<T> From<Rejected<T>> for PoolError {
    fn from(_: Rejected<T>) -> Self {
        PoolError::InvalidHandle
    }
}

/// Result type alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
