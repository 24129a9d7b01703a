//! Idle-worker storage.
//!
//! Two interchangeable containers behind one trait: a growable LIFO stack for
//! lazily-grown pools and a fixed-capacity ring for pre-allocated pools. Both
//! keep workers ordered by non-decreasing recycle time — every insert goes
//! through the pool's revert path, which stamps `Instant::now()` under the
//! pool lock — so the expiry scan is a binary search for a prefix.

use std::time::Instant;

use crate::error::PoolError;

use super::worker::TaskSender;

pub(crate) mod ring;
pub(crate) mod stack;

pub(crate) use ring::RingQueue;
pub(crate) use stack::StackQueue;

/// An idle worker as the queue sees it: the send endpoint of its task channel
/// and the moment it was recycled.
pub(crate) struct IdleWorker {
    pub(crate) task_tx: TaskSender,
    pub(crate) recycled_at: Instant,
}

/// Contract shared by both idle-worker containers.
///
/// `retrieve_expired` takes the caller-computed cutoff instant rather than
/// reading the clock, so the containers stay clock-free and testable.
pub(crate) trait WorkerQueue {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append at the tail. The ring refuses with `QueueFull` when full.
    fn insert(&mut self, worker: IdleWorker) -> Result<(), PoolError>;

    /// Remove and return the most recently inserted worker (LIFO, for cache
    /// locality), or `None` when empty.
    fn detach(&mut self) -> Option<IdleWorker>;

    /// Remove and return every worker recycled at or before `cutoff`,
    /// preserving order among the survivors.
    fn retrieve_expired(&mut self, cutoff: Instant) -> Vec<IdleWorker>;

    /// Send the exit sentinel to every stored worker and empty the queue.
    fn reset(&mut self);
}
