//! Worker thread loop.
//!
//! A worker is an OS thread bound to a single-slot task channel. It receives
//! tasks, runs them under a panic catcher, and reverts itself to the pool
//! after each one. A revert refusal or the exit sentinel ends the loop; the
//! thread then decrements the running count and recycles its channel.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};

use super::controller::Shared;

/// A task accepted by the pool. Opaque: the pool never inspects it.
pub(crate) type Task = Box<dyn FnOnce() + Send + 'static>;

/// Send endpoint of a worker's task channel. `None` is the exit sentinel.
pub(crate) type TaskSender = Sender<Option<Task>>;

/// Task channel capacity. One slot suffices: only the pool sends, and only
/// after taking the worker out of the idle queue, so there is never more
/// than one outstanding task per worker.
pub(crate) const TASK_CHAN_CAP: usize = 1;

/// Both endpoints of a worker's task channel. The worker thread owns the
/// pair for its lifetime; exited workers hand it back through the cache.
pub(crate) struct WorkerChannel {
    pub(crate) tx: TaskSender,
    pub(crate) rx: Receiver<Option<Task>>,
}

impl WorkerChannel {
    pub(crate) fn new() -> Self {
        let (tx, rx) = bounded(TASK_CHAN_CAP);
        Self { tx, rx }
    }
}

/// Spawns a worker draining a channel drawn from the cache and returns the
/// send endpoint for its first task. The caller has already incremented the
/// running count under the pool lock to claim the capacity slot.
pub(crate) fn spawn_worker(shared: &Arc<Shared>) -> TaskSender {
    let chan = shared.cache.get();
    let task_tx = chan.tx.clone();
    let pool = Arc::clone(shared);
    thread::Builder::new()
        .name(format!("workpool-worker-{}", shared.next_worker_id()))
        .spawn(move || worker_loop(pool, chan))
        .expect("failed to spawn worker thread");
    task_tx
}

fn worker_loop(pool: Arc<Shared>, chan: WorkerChannel) {
    loop {
        match chan.rx.recv() {
            Ok(Some(task)) => {
                // Contain the panic before reverting: the worker outlives a
                // panicked task.
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
                    pool.report_task_panic(payload);
                }
                if !pool.revert_worker(&chan.tx) {
                    break;
                }
            }
            // Exit sentinel, or every sender gone.
            Ok(None) | Err(_) => break,
        }
    }
    pool.dec_running();
    pool.cache.put(chan);
}
