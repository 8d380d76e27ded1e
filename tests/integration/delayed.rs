//! Delayed task execution

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use taskqueue::{DelayTask, ManualClock, TaskQueue};

use crate::helpers::{wait_until, Log, EVENTUALLY};

#[test]
fn test_runs_in_deadline_order() {
    let pool = TaskQueue::new(2).unwrap();
    let log = Log::new();

    for (id, delay) in [(0, 150), (1, 10), (2, 80)] {
        pool.schedule_ms(delay, log.recorder(id)).unwrap();
    }

    assert!(wait_until(EVENTUALLY, || log.len() == 3));
    assert_eq!(log.snapshot(), vec![1, 2, 0]);
    assert_eq!(pool.stats().executed_delayed, 3);
}

#[test]
fn test_equal_deadlines_run_in_submission_order() {
    let clock = Arc::new(ManualClock::new(1_000));
    let pool = TaskQueue::builder()
        .workers(1)
        .clock(clock.clone())
        .build()
        .unwrap();
    let log = Log::new();

    // Pin the clock so both tasks share one deadline.
    let first = DelayTask::new(log.recorder(0));
    let second = DelayTask::new(log.recorder(1));
    pool.schedule_task(first, 20).unwrap();
    pool.schedule_task(second, 20).unwrap();
    clock.advance(20);

    assert!(wait_until(EVENTUALLY, || log.len() == 2));
    assert_eq!(log.snapshot(), vec![0, 1]);
}

#[test]
fn test_not_run_before_deadline() {
    let pool = TaskQueue::new(2).unwrap();
    let started = Instant::now();
    let ran_at = Arc::new(std::sync::Mutex::new(None));

    let r = Arc::clone(&ran_at);
    pool.schedule(Duration::from_millis(60), move || {
        *r.lock().unwrap() = Some(Instant::now());
    })
    .unwrap();

    assert!(wait_until(EVENTUALLY, || ran_at.lock().unwrap().is_some()));
    let ran_at = ran_at.lock().unwrap().unwrap();
    assert!(ran_at.duration_since(started) >= Duration::from_millis(59));
}

#[test]
fn test_zero_delay_runs_promptly() {
    let pool = TaskQueue::new(1).unwrap();
    let log = Log::new();

    pool.schedule_ms(0, log.recorder(7)).unwrap();

    assert!(wait_until(Duration::from_secs(2), || log.len() == 1));
}

#[test]
fn test_manual_clock_controls_deadlines() {
    let clock = Arc::new(ManualClock::new(0));
    let pool = TaskQueue::builder()
        .workers(1)
        .clock(clock.clone())
        .build()
        .unwrap();
    let log = Log::new();

    pool.schedule_ms(100, log.recorder(0)).unwrap();

    // Real time passes but the pool clock does not.
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(log.len(), 0);
    assert_eq!(pool.stats().pending_delayed, 1);

    clock.advance(100);
    assert!(wait_until(EVENTUALLY, || log.len() == 1));
    assert_eq!(pool.stats().pending_delayed, 0);
}

#[test]
fn test_take_delayed_before_destroy() {
    let pool = TaskQueue::new(1).unwrap();
    let log = Log::new();

    for (id, delay) in [(0, 60_000), (1, 30_000), (2, 30_000)] {
        pool.schedule_ms(delay, log.recorder(id)).unwrap();
    }

    let pending = pool.take_delayed();
    assert_eq!(pending.len(), 3);
    assert_eq!(pool.stats().pending_delayed, 0);

    // Caller decides what to do with them; here, run them in order.
    for task in pending {
        task.run();
    }
    assert_eq!(log.snapshot(), vec![1, 2, 0]);
    assert!(pool.destroy().is_empty());
}

#[test]
fn test_each_delay_task_runs_once_under_contention() {
    let pool = TaskQueue::new(4).unwrap();
    let counts: Arc<Vec<AtomicUsize>> = Arc::new((0..2000).map(|_| AtomicUsize::new(0)).collect());

    for i in 0..2000usize {
        let counts = Arc::clone(&counts);
        pool.schedule_ms((i % 7) as u64, move || {
            counts[i].fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    assert!(wait_until(EVENTUALLY, || pool.stats().executed_delayed == 2000));
    assert!(counts.iter().all(|c| c.load(Ordering::SeqCst) == 1));
    assert_eq!(pool.stats().pending_delayed, 0);
}
