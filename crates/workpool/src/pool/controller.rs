//! src/pool/controller.rs
//!
//! The pool controller: lifecycle state, capacity accounting, the dispatch
//! and revert protocol, and the expiry reaper.
//!
//! # Locking discipline
//!
//! One mutex guards the idle queue and the blocked-submitter count; `running`,
//! `capacity` and `state` are atomics for the lock-free fast paths. The
//! condition variable is signalled once per revert (one handoff, one wake)
//! and broadcast on release and when the reaper drives the running count to
//! zero. User tasks never run under the lock, so poisoning cannot arise from
//! them and guard acquisition unwraps.

use std::any::Any;
use std::backtrace::Backtrace;
use std::sync::atomic::{AtomicI32, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Instant;

use tracing::{debug, error};

use crate::error::PoolError;

use super::cache::WorkerCache;
use super::config::{PoolConfig, DEFAULT_EXPIRY};
use super::queue::{IdleWorker, RingQueue, StackQueue, WorkerQueue};
use super::worker::{spawn_worker, TaskSender};

/// Capacity value meaning "no limit on the number of workers".
const UNBOUNDED: i32 = -1;

const OPENED: u32 = 0;
const CLOSED: u32 = 1;

/// A bounded pool of reusable worker threads.
///
/// Producers on any thread call [`submit`](Pool::submit); tasks run on a set
/// of at most `cap()` workers. Idle workers are retired after the configured
/// expiry. Dropping the pool releases it: idle workers are told to exit,
/// blocked submitters are woken, and in-flight tasks run to completion.
pub struct Pool {
    shared: Arc<Shared>,
}

/// State shared by the pool handle, its workers, and the reaper. Workers and
/// the reaper each hold an `Arc` of this, so a released pool stays valid
/// until the last thread drains.
pub(crate) struct Shared {
    capacity: AtomicI32,
    running: AtomicI32,
    state: AtomicU32,
    idle: Mutex<IdleState>,
    cond: Condvar,
    pub(crate) cache: WorkerCache,
    config: PoolConfig,
    worker_seq: AtomicUsize,
}

struct IdleState {
    queue: Box<dyn WorkerQueue + Send>,
    /// Submitters currently parked on the condvar. Guarded by the mutex,
    /// never atomic.
    blocked: usize,
}

impl Pool {
    /// Creates a pool with default configuration. `size <= 0` means
    /// unbounded.
    pub fn new(size: i32) -> Result<Self, PoolError> {
        Self::with_config(size, PoolConfig::default())
    }

    /// Creates a pool with the given configuration.
    ///
    /// Pre-allocation requires a positive `size` and stores idle workers in
    /// a ring of exactly that capacity; otherwise storage starts empty and
    /// grows on demand. The reaper thread is running by the time this
    /// returns.
    pub fn with_config(size: i32, mut config: PoolConfig) -> Result<Self, PoolError> {
        let capacity = if size <= 0 { UNBOUNDED } else { size };
        if config.expiry_duration.is_zero() {
            config.expiry_duration = DEFAULT_EXPIRY;
        }

        let queue: Box<dyn WorkerQueue + Send> = if config.pre_alloc {
            if capacity == UNBOUNDED {
                return Err(PoolError::InvalidPreAllocSize);
            }
            Box::new(RingQueue::with_capacity(capacity as usize))
        } else {
            Box::new(StackQueue::new())
        };

        let shared = Arc::new(Shared {
            capacity: AtomicI32::new(capacity),
            running: AtomicI32::new(0),
            state: AtomicU32::new(OPENED),
            idle: Mutex::new(IdleState { queue, blocked: 0 }),
            cond: Condvar::new(),
            cache: WorkerCache::new(),
            config,
            worker_seq: AtomicUsize::new(0),
        });
        spawn_reaper(Arc::clone(&shared));
        Ok(Self { shared })
    }

    /// Submits a task for execution on some worker.
    ///
    /// Returns `PoolClosed` after `release`, and `PoolOverload` when no
    /// worker could be obtained — immediately in nonblocking mode, or once
    /// `max_blocking_tasks` submitters are already waiting.
    pub fn submit(&self, task: impl FnOnce() + Send + 'static) -> Result<(), PoolError> {
        if self.is_closed() {
            return Err(PoolError::PoolClosed);
        }
        let Some(task_tx) = self.shared.retrieve_worker() else {
            return Err(PoolError::PoolOverload);
        };
        // Single-slot channel with a draining worker on the other end: the
        // send cannot block, and the worker owns a sender itself so the
        // channel cannot disconnect under us.
        let _ = task_tx.send(Some(Box::new(task)));
        Ok(())
    }

    /// Number of live workers (idle + executing).
    pub fn running(&self) -> i32 {
        self.shared.running()
    }

    /// Maximum number of simultaneous workers; -1 when unbounded.
    pub fn cap(&self) -> i32 {
        self.shared.capacity()
    }

    /// Workers available before the pool is at capacity. On an unbounded
    /// pool this is `-1 - running()`, which is negative and meaningless;
    /// callers must not rely on it.
    pub fn free(&self) -> i32 {
        self.cap() - self.running()
    }

    /// Changes the pool capacity. No-op when unbounded, `size <= 0`, the
    /// size is unchanged, or the pool was pre-allocated. Shrinking never
    /// force-kills workers: excess workers retire on their next revert.
    pub fn tune(&self, size: i32) {
        let capacity = self.cap();
        if capacity == UNBOUNDED || size <= 0 || size == capacity || self.shared.config.pre_alloc
        {
            return;
        }
        self.shared.capacity.store(size, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Closes the pool: idle workers are told to exit and every blocked
    /// submitter is woken to observe the closed state. In-flight tasks run
    /// to completion. Calling `release` on a closed pool does nothing.
    pub fn release(&self) {
        if self
            .shared
            .state
            .compare_exchange(OPENED, CLOSED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        {
            let mut idle = self.shared.idle.lock().unwrap();
            idle.queue.reset();
        }
        self.shared.cond.notify_all();
    }

    /// Reopens a released pool and restarts the reaper. No-op on an open
    /// pool. Workers that already exited are gone; new ones are constructed
    /// on demand.
    pub fn reboot(&self) {
        if self
            .shared
            .state
            .compare_exchange(CLOSED, OPENED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            spawn_reaper(Arc::clone(&self.shared));
        }
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.release();
    }
}

impl Shared {
    pub(crate) fn capacity(&self) -> i32 {
        self.capacity.load(Ordering::Acquire)
    }

    pub(crate) fn running(&self) -> i32 {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.load(Ordering::Acquire) == CLOSED
    }

    pub(crate) fn inc_running(&self) {
        self.running.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn dec_running(&self) {
        self.running.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn next_worker_id(&self) -> usize {
        self.worker_seq.fetch_add(1, Ordering::Relaxed)
    }

    /// The dispatch path: an idle worker if one exists, a fresh worker while
    /// below capacity, otherwise block (unless configured not to) until a
    /// revert hands one over or the pool empties out.
    fn retrieve_worker(self: &Arc<Self>) -> Option<TaskSender> {
        let mut idle = self.idle.lock().unwrap();

        if let Some(worker) = idle.queue.detach() {
            drop(idle);
            return Some(worker.task_tx);
        }

        let capacity = self.capacity();
        if capacity == UNBOUNDED || self.running() < capacity {
            // Claim the slot before giving up the lock so concurrent
            // submitters cannot overshoot the capacity; the spawned worker
            // owns the decrement.
            self.inc_running();
            drop(idle);
            return Some(spawn_worker(self));
        }

        if self.config.nonblocking {
            return None;
        }

        loop {
            let max_blocking = self.config.max_blocking_tasks;
            if max_blocking != 0 && idle.blocked >= max_blocking {
                return None;
            }
            idle.blocked += 1;
            idle = self.cond.wait(idle).unwrap();
            idle.blocked -= 1;

            // Release broadcasts so that parked submitters observe the
            // closed pool instead of re-parking forever.
            if self.is_closed() {
                return None;
            }

            if self.running() == 0 {
                // The reaper retired every worker while we were parked; no
                // revert signal is coming, so grow again ourselves.
                self.inc_running();
                drop(idle);
                return Some(spawn_worker(self));
            }

            if let Some(worker) = idle.queue.detach() {
                drop(idle);
                return Some(worker.task_tx);
            }

            if self.running() < self.capacity() {
                self.inc_running();
                drop(idle);
                return Some(spawn_worker(self));
            }
        }
    }

    /// Returns a finished worker to the idle queue. A `false` return tells
    /// the worker to terminate: the pool is closed, shrunk below the running
    /// count, or the queue refused the insert.
    pub(crate) fn revert_worker(&self, task_tx: &TaskSender) -> bool {
        let capacity = self.capacity();
        if self.is_closed() || (capacity > 0 && self.running() > capacity) {
            return false;
        }

        let mut idle = self.idle.lock().unwrap();
        // Double-check: release may have won the race before we took the
        // lock, and its reset must not miss this worker.
        if self.is_closed() {
            return false;
        }
        let worker = IdleWorker {
            task_tx: task_tx.clone(),
            recycled_at: Instant::now(),
        };
        if idle.queue.insert(worker).is_err() {
            return false;
        }
        self.cond.notify_one();
        true
    }

    pub(crate) fn report_task_panic(&self, payload: Box<dyn Any + Send>) {
        match &self.config.panic_handler {
            Some(handler) => handler(payload),
            None => {
                let backtrace = Backtrace::force_capture();
                error!(panic = panic_message(payload.as_ref()), %backtrace, "worker task panicked");
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

fn spawn_reaper(shared: Arc<Shared>) {
    thread::Builder::new()
        .name("workpool-reaper".to_string())
        .spawn(move || reaper_loop(shared))
        .expect("failed to spawn reaper thread");
}

/// Periodically retires workers idle longer than the expiry, until the pool
/// closes.
fn reaper_loop(shared: Arc<Shared>) {
    let period = shared.config.expiry_duration;
    loop {
        thread::sleep(period);
        if shared.is_closed() {
            break;
        }

        let expired = match Instant::now().checked_sub(period) {
            Some(cutoff) => shared.idle.lock().unwrap().queue.retrieve_expired(cutoff),
            None => Vec::new(),
        };
        if !expired.is_empty() {
            debug!(count = expired.len(), "retiring expired idle workers");
        }
        // A sentinel send can block on a busy channel; keep it outside the
        // pool lock.
        for worker in expired {
            let _ = worker.task_tx.send(None);
        }

        if shared.running() == 0 {
            // Everyone was reaped while submitters were parked waiting for a
            // revert signal no worker is left to send; wake them all so they
            // can spawn fresh workers.
            let guard = shared.idle.lock().unwrap();
            shared.cond.notify_all();
            drop(guard);
        }
    }
}
