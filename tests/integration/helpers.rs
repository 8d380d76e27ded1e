//! Test helpers and utilities

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use taskqueue::Task;

/// Shared, ordered record of task ids as they execute.
#[derive(Clone, Default)]
pub struct Log {
    entries: Arc<Mutex<Vec<usize>>>,
}

#[allow(dead_code)]
impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `id` to the log.
    pub fn push(&self, id: usize) {
        self.entries.lock().unwrap().push(id);
    }

    /// Closure that records `id` when run.
    pub fn recorder(&self, id: usize) -> impl FnOnce() + Send + 'static {
        let log = self.clone();
        move || log.push(id)
    }

    /// Task that records `id` when run.
    pub fn task(&self, id: usize) -> Task {
        Task::new(self.recorder(id))
    }

    pub fn snapshot(&self) -> Vec<usize> {
        self.entries.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

/// Poll `cond` until it holds or `timeout` elapses.
pub fn wait_until<F: Fn() -> bool>(timeout: Duration, cond: F) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}

/// Generous bound for "eventually" assertions.
pub const EVENTUALLY: Duration = Duration::from_secs(10);
