//! Idle sleep and wakeup behavior

use std::time::{Duration, Instant};

use taskqueue::TaskQueue;

use crate::helpers::{wait_until, Log, EVENTUALLY};

#[test]
fn test_idle_workers_do_not_spin() {
    let pool = TaskQueue::builder()
        .workers(2)
        .max_idle_wait(Duration::from_millis(50))
        .build()
        .unwrap();

    std::thread::sleep(Duration::from_millis(300));

    // Two workers, ~6 ceilings each, plus slack for spurious wakeups.
    let waits = pool.stats().idle_waits;
    assert!(waits <= 40, "idle workers waited {} times", waits);
}

#[test]
fn test_enqueue_wakes_sleeping_worker() {
    let pool = TaskQueue::new(1).unwrap();
    let log = Log::new();

    // The worker is now in its one-hour idle wait.
    std::thread::sleep(Duration::from_millis(50));
    let start = Instant::now();
    pool.enqueue(log.recorder(1)).unwrap();

    assert!(wait_until(EVENTUALLY, || log.len() == 1));
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_earlier_deadline_overrides_stale_cache() {
    let pool = TaskQueue::new(2).unwrap();
    let log = Log::new();

    // Every worker caches a deadline a minute out and goes to sleep.
    pool.schedule_ms(60_000, log.recorder(0)).unwrap();
    std::thread::sleep(Duration::from_millis(50));

    // A nearer deadline must still be honored.
    let start = Instant::now();
    pool.schedule_ms(20, log.recorder(1)).unwrap();

    assert!(wait_until(EVENTUALLY, || log.len() == 1));
    assert_eq!(log.snapshot(), vec![1]);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_busy_worker_does_not_block_delayed_work() {
    let pool = TaskQueue::new(2).unwrap();
    let log = Log::new();

    // One worker is tied up; the other must still serve the deadline.
    pool.enqueue(|| std::thread::sleep(Duration::from_millis(500)))
        .unwrap();
    pool.schedule_ms(20, log.recorder(1)).unwrap();

    assert!(wait_until(Duration::from_millis(400), || log.len() == 1));
}
