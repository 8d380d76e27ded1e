//! Pool shutdown and drain semantics

use std::collections::HashSet;
use std::time::{Duration, Instant};

use taskqueue::{PoolError, TaskQueue};

use crate::helpers::Log;

#[test]
fn test_destroy_accounts_for_every_task() {
    let pool = TaskQueue::new(2).unwrap();
    let handle = pool.handle();
    let log = Log::new();

    for id in 0..100 {
        pool.enqueue(log.recorder(id)).unwrap();
    }
    let unexecuted = pool.destroy();

    let executed = log.len();
    assert_eq!(handle.stats().executed_tasks as usize, executed);
    assert_eq!(executed + unexecuted.len(), 100);

    // Running the leftovers must complete the set with no duplicates.
    for task in unexecuted {
        task.run();
    }
    let ids = log.snapshot();
    assert_eq!(ids.len(), 100);
    assert_eq!(ids.iter().copied().collect::<HashSet<_>>().len(), 100);
}

#[test]
fn test_destroy_returns_promptly_while_idle() {
    let pool = TaskQueue::new(4).unwrap();
    // Let every worker reach its (one hour) idle wait.
    std::thread::sleep(Duration::from_millis(50));

    let start = Instant::now();
    let unexecuted = pool.destroy();
    assert!(unexecuted.is_empty());
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_destroy_drops_pending_delay_tasks() {
    let pool = TaskQueue::new(1).unwrap();
    let handle = pool.handle();
    let log = Log::new();

    pool.schedule_ms(60_000, log.recorder(0)).unwrap();
    assert_eq!(handle.stats().pending_delayed, 1);

    let start = Instant::now();
    assert!(pool.destroy().is_empty());
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(log.len(), 0);
}

#[test]
fn test_handle_rejects_after_destroy() {
    let pool = TaskQueue::new(2).unwrap();
    let handle = pool.handle();
    drop(pool);

    assert_eq!(handle.enqueue(|| {}), Err(PoolError::InvalidHandle));
    assert_eq!(
        handle.schedule(Duration::from_millis(1), || {}),
        Err(PoolError::InvalidHandle)
    );
}

#[test]
fn test_independent_pools() {
    let a = TaskQueue::builder().name("a").workers(1).build().unwrap();
    let b = TaskQueue::builder().name("b").workers(1).build().unwrap();
    let log = Log::new();

    a.enqueue(log.recorder(1)).unwrap();
    b.enqueue(log.recorder(2)).unwrap();
    drop(a);

    // b keeps working after a is gone.
    let rx = b.submit(|| 3).unwrap();
    assert_eq!(tokio_test::block_on(rx).unwrap(), 3);
}
