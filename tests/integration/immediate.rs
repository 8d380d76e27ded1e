//! Immediate task execution

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::future::join_all;
use taskqueue::TaskQueue;

use crate::helpers::{wait_until, Log, EVENTUALLY};

#[test]
fn test_single_worker_runs_in_submission_order() {
    let pool = TaskQueue::new(1).unwrap();
    let log = Log::new();

    for id in 0..500 {
        pool.enqueue_task(log.task(id)).unwrap();
    }

    assert!(wait_until(EVENTUALLY, || log.len() == 500));
    assert_eq!(log.snapshot(), (0..500).collect::<Vec<_>>());
    assert!(pool.destroy().is_empty());
}

#[test]
fn test_two_workers_run_three_tasks() {
    let pool = TaskQueue::new(2).unwrap();
    let log = Log::new();

    for id in 1..=3 {
        pool.enqueue(log.recorder(id)).unwrap();
    }

    assert!(wait_until(EVENTUALLY, || log.len() == 3));
    // Two workers may finish out of order; each task runs exactly once.
    let mut ran = log.snapshot();
    ran.sort_unstable();
    assert_eq!(ran, vec![1, 2, 3]);
}

#[test]
fn test_each_task_runs_once_under_contention() {
    let pool = TaskQueue::new(4).unwrap();
    let counts: Arc<Vec<AtomicUsize>> = Arc::new((0..1000).map(|_| AtomicUsize::new(0)).collect());

    let producers: Vec<_> = (0..4usize)
        .map(|p| {
            let handle = pool.handle();
            let counts = Arc::clone(&counts);
            std::thread::spawn(move || {
                for i in (p * 250)..((p + 1) * 250) {
                    let counts = Arc::clone(&counts);
                    handle
                        .enqueue(move || {
                            counts[i].fetch_add(1, Ordering::SeqCst);
                        })
                        .unwrap();
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    assert!(wait_until(EVENTUALLY, || pool.stats().executed_tasks == 1000));
    assert!(counts.iter().all(|c| c.load(Ordering::SeqCst) == 1));
}

#[test]
fn test_submit_returns_results() {
    let pool = TaskQueue::new(4).unwrap();

    let receivers: Vec<_> = (0..10).map(|i| pool.submit(move || i + 1).unwrap()).collect();

    let results: Vec<_> = tokio_test::block_on(join_all(receivers))
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(results, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
}
