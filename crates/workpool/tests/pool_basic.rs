//! Construction, capacity accounting, and basic execution tests.
//!
//! Tests cover:
//! - Counter semantics (running, free, cap) for bounded and unbounded pools
//! - Pre-allocation validation and its fixed-size ring
//! - Capacity tuning rules
//! - Bounded concurrency while draining a large task batch

mod common;
use common::{update_max_atomic, wait_until};

use anyhow::Result;
use crossbeam_channel::bounded;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use workpool::{Pool, PoolConfig, PoolError};

// ============================================================================
// 1. Construction and accounting
// ============================================================================

#[test]
fn test_pool_counters_start_empty() -> Result<()> {
    let pool = Pool::new(5)?;
    assert_eq!(pool.cap(), 5);
    assert_eq!(pool.running(), 0);
    assert_eq!(pool.free(), 5);
    assert!(!pool.is_closed());
    Ok(())
}

#[test]
fn test_unbounded_pool() -> Result<()> {
    let pool = Pool::new(0)?;
    assert_eq!(pool.cap(), -1);

    let done = Arc::new(AtomicUsize::new(0));
    for _ in 0..32 {
        let done = done.clone();
        pool.submit(move || {
            done.fetch_add(1, Ordering::SeqCst);
        })?;
    }
    assert!(
        wait_until(Duration::from_secs(5), || done.load(Ordering::SeqCst) == 32),
        "all tasks complete on an unbounded pool, got {}",
        done.load(Ordering::SeqCst)
    );

    // Capacity tuning has no meaning without a bound.
    pool.tune(10);
    assert_eq!(pool.cap(), -1);
    Ok(())
}

#[test]
fn test_prealloc_rejects_unbounded_size() {
    let config = PoolConfig::builder().pre_alloc(true).build();
    match Pool::with_config(0, config) {
        Err(err) => assert_eq!(err, PoolError::InvalidPreAllocSize),
        Ok(_) => panic!("pre-allocation with an unbounded size must be rejected"),
    }
}

#[test]
fn test_running_and_free_track_busy_workers() -> Result<()> {
    let pool = Pool::new(5)?;
    let (gate_tx, gate_rx) = bounded::<()>(0);
    let done = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let gate_rx = gate_rx.clone();
        let done = done.clone();
        pool.submit(move || {
            let _ = gate_rx.recv();
            done.fetch_add(1, Ordering::SeqCst);
        })?;
    }
    assert!(wait_until(Duration::from_secs(1), || pool.running() == 2));
    assert_eq!(pool.free(), 3);

    drop(gate_tx);
    assert!(wait_until(Duration::from_secs(1), || {
        done.load(Ordering::SeqCst) == 2
    }));
    // Finished workers revert to the idle queue; they are still alive.
    assert_eq!(pool.running(), 2);
    assert_eq!(pool.free(), 3);
    Ok(())
}

// ============================================================================
// 2. Capacity tuning
// ============================================================================

#[test]
fn test_tune_adjusts_capacity() -> Result<()> {
    let pool = Pool::new(4)?;
    pool.tune(8);
    assert_eq!(pool.cap(), 8);

    pool.tune(0);
    assert_eq!(pool.cap(), 8, "non-positive sizes are ignored");
    pool.tune(-3);
    assert_eq!(pool.cap(), 8);

    pool.tune(2);
    assert_eq!(pool.cap(), 2, "shrinking stores the new bound");
    Ok(())
}

#[test]
fn test_prealloc_pool_executes_and_ignores_tune() -> Result<()> {
    let config = PoolConfig::builder().pre_alloc(true).build();
    let pool = Pool::with_config(4, config)?;
    assert_eq!(pool.cap(), 4);

    let done = Arc::new(AtomicUsize::new(0));
    for _ in 0..100 {
        let done = done.clone();
        pool.submit(move || {
            done.fetch_add(1, Ordering::SeqCst);
        })?;
    }
    assert!(
        wait_until(Duration::from_secs(5), || done.load(Ordering::SeqCst) == 100),
        "got {}",
        done.load(Ordering::SeqCst)
    );

    pool.tune(8);
    assert_eq!(pool.cap(), 4, "a pre-allocated ring has a fixed size");
    Ok(())
}

// ============================================================================
// 3. Basic execution
// ============================================================================

#[test]
fn test_basic_execution_bounded_concurrency() -> Result<()> {
    let pool = Pool::new(10)?;

    let counter = Arc::new(AtomicUsize::new(0));
    let active = Arc::new(AtomicUsize::new(0));
    let max_active = Arc::new(AtomicUsize::new(0));

    for _ in 0..1000 {
        let counter = counter.clone();
        let active = active.clone();
        let max_active = max_active.clone();
        pool.submit(move || {
            let current = active.fetch_add(1, Ordering::SeqCst) + 1;
            update_max_atomic(current, &max_active);
            counter.fetch_add(1, Ordering::SeqCst);
            active.fetch_sub(1, Ordering::SeqCst);
        })?;
    }

    assert!(
        wait_until(Duration::from_secs(10), || {
            counter.load(Ordering::SeqCst) == 1000
        }),
        "all 1000 tasks complete, got {}",
        counter.load(Ordering::SeqCst)
    );
    let peak = max_active.load(Ordering::SeqCst);
    assert!(
        peak <= 10,
        "never more than capacity tasks in flight, saw {}",
        peak
    );
    assert!(pool.running() <= 10);
    Ok(())
}
