use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use galsim::{SchedulerError, ThreadPool};

// ==================================================================================
// Submit / results
// ==================================================================================

#[test]
fn submit_single_task_returns_result() {
    let pool = ThreadPool::new(4).unwrap();
    let handle = pool.submit(|| 42).unwrap();
    assert_eq!(handle.join().unwrap(), 42);
}

#[test]
fn submit_many_tasks_returns_each_result() {
    let pool = ThreadPool::new(4).unwrap();
    let handles: Vec<_> = (0..10).map(|i| pool.submit(move || i * i).unwrap()).collect();

    for (i, h) in handles.into_iter().enumerate() {
        assert_eq!(h.join().unwrap(), i * i);
    }
}

#[test]
fn zero_workers_is_rejected() {
    assert!(matches!(ThreadPool::new(0), Err(SchedulerError::ZeroWorkers)));
}

#[test]
fn reports_thread_count() {
    let pool = ThreadPool::new(3).unwrap();
    assert_eq!(pool.num_threads(), 3);
}

// ==================================================================================
// Fork-join / barrier
// ==================================================================================

#[test]
fn parallel_for_each_visits_every_element() {
    let pool = ThreadPool::new(4).unwrap();
    let sum = Arc::new(AtomicUsize::new(0));

    let s = Arc::clone(&sum);
    let data = pool
        .parallel_for_each(vec![0; 100], move |v| {
            *v = 1;
            s.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    assert_eq!(sum.load(Ordering::SeqCst), 100);
    assert_eq!(data.len(), 100);
    assert!(data.iter().all(|&v| v == 1));
}

#[test]
fn parallel_for_each_keeps_input_order() {
    let pool = ThreadPool::new(3).unwrap();
    let out = pool.parallel_for_each((0..50).collect::<Vec<u64>>(), |v| *v *= 10).unwrap();
    assert_eq!(out, (0..50).map(|v| v * 10).collect::<Vec<u64>>());
}

#[test]
fn parallel_for_each_on_empty_input_is_a_no_op() {
    let pool = ThreadPool::new(2).unwrap();
    let out = pool.parallel_for_each(Vec::<u32>::new(), |v| *v += 1).unwrap();
    assert!(out.is_empty());
    assert_eq!(pool.pending_task_count(), 0);
}

#[test]
fn parallel_map_reports_each_outcome() {
    let pool = ThreadPool::new(2).unwrap();
    let outcomes = pool.parallel_map(vec![1u32, 2, 3], |v| {
        if v == 2 {
            panic!("two");
        }
        v + 100
    });

    assert_eq!(outcomes.len(), 3);
    assert_eq!(*outcomes[0].as_ref().unwrap(), 101);
    assert!(matches!(outcomes[1], Err(SchedulerError::TaskPanicked(_))));
    assert_eq!(*outcomes[2].as_ref().unwrap(), 103);
    assert!(pool.wait_for_all().is_ok());
}

#[test]
fn parallel_map_after_shutdown_refuses_every_item() {
    let pool = ThreadPool::new(1).unwrap();
    pool.shutdown();
    let outcomes = pool.parallel_map(vec![1, 2], |v| v);
    assert!(outcomes.iter().all(|o| matches!(o, Err(SchedulerError::ShuttingDown))));
}

#[test]
fn thousand_increments_are_never_lost() {
    let pool = ThreadPool::new(8).unwrap();

    for _ in 0..20 {
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..1000 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.wait_for_all().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1000);
        assert_eq!(pool.pending_task_count(), 0);
    }
}

#[test]
fn wait_for_all_on_idle_pool_returns_immediately() {
    let pool = ThreadPool::new(2).unwrap();
    pool.wait_for_all().unwrap();
    assert_eq!(pool.pending_task_count(), 0);
}

#[test]
fn pending_count_includes_queued_work() {
    let pool = ThreadPool::new(1).unwrap();
    let gate = Arc::new(parking_lot::Mutex::new(()));
    let held = gate.lock();

    let g = Arc::clone(&gate);
    pool.submit(move || {
        let _unused = g.lock();
    })
    .unwrap();
    pool.submit(|| ()).unwrap();

    // one blocked on the gate (or still queued) plus one queued
    assert_eq!(pool.pending_task_count(), 2);

    drop(held);
    pool.wait_for_all().unwrap();
    assert_eq!(pool.pending_task_count(), 0);
}

// ==================================================================================
// Shutdown
// ==================================================================================

#[test]
fn submit_after_shutdown_fails() {
    let pool = ThreadPool::new(2).unwrap();
    pool.shutdown();
    assert!(matches!(pool.submit(|| 1), Err(SchedulerError::ShuttingDown)));
}

#[test]
fn shutdown_drains_queued_work() {
    let pool = ThreadPool::new(1).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    pool.submit(|| thread::sleep(Duration::from_millis(20))).unwrap();
    for _ in 0..10 {
        let counter = Arc::clone(&counter);
        pool.submit(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    pool.shutdown();
    assert_eq!(counter.load(Ordering::SeqCst), 10);
}

#[test]
fn shutdown_is_idempotent() {
    let pool = ThreadPool::new(2).unwrap();
    pool.shutdown();
    pool.shutdown();
    drop(pool);
}

#[test]
fn drop_finishes_in_flight_work() {
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let pool = ThreadPool::new(2).unwrap();
        for _ in 0..50 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                thread::sleep(Duration::from_micros(100));
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
    }
    assert_eq!(counter.load(Ordering::SeqCst), 50);
}

// ==================================================================================
// Task failure
// ==================================================================================

#[test]
fn panicking_task_is_reported_through_its_handle() {
    let pool = ThreadPool::new(2).unwrap();
    let handle = pool.submit(|| -> u32 { panic!("boom") }).unwrap();

    match handle.join() {
        Err(SchedulerError::TaskPanicked(msg)) => assert!(msg.contains("boom")),
        other => panic!("expected TaskPanicked, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn panicking_task_fails_the_next_barrier_only() {
    let pool = ThreadPool::new(2).unwrap();
    let _ = pool.submit(|| panic!("range task failed")).unwrap();

    assert!(matches!(pool.wait_for_all(), Err(SchedulerError::TaskPanicked(_))));
    assert!(pool.wait_for_all().is_ok());

    // workers survive the panic
    assert_eq!(pool.submit(|| 7).unwrap().join().unwrap(), 7);
}

#[test]
fn parallel_for_each_propagates_panic_after_all_items_ran() {
    let pool = ThreadPool::new(4).unwrap();
    let visited = Arc::new(AtomicUsize::new(0));

    let v = Arc::clone(&visited);
    let result = pool.parallel_for_each((0..16).collect::<Vec<usize>>(), move |x| {
        v.fetch_add(1, Ordering::SeqCst);
        if *x == 5 {
            panic!("bad slice");
        }
        *x *= 2;
    });

    assert!(matches!(result, Err(SchedulerError::TaskPanicked(_))));
    assert_eq!(visited.load(Ordering::SeqCst), 16);
    // already reported by parallel_for_each
    assert!(pool.wait_for_all().is_ok());
}
