//! Shared helpers for pool integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Polls `condition` until it holds or `timeout` elapses.
#[allow(dead_code)]
pub fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Helper to track and update maximum concurrent operations
#[allow(dead_code)]
pub fn update_max_atomic(current: usize, max_atomic: &AtomicUsize) {
    let mut max = max_atomic.load(Ordering::SeqCst);
    while current > max {
        match max_atomic.compare_exchange(max, current, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => break,
            Err(actual) => max = actual,
        }
    }
}
