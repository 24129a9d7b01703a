//! Growable LIFO storage for idle workers.
//!
//! Used by lazily-grown pools: storage starts empty and grows with the high
//! water mark of idle workers. Detach pops the most recently recycled worker;
//! expiry drains the oldest prefix.

use std::time::Instant;

use crate::error::PoolError;

use super::{IdleWorker, WorkerQueue};

pub(crate) struct StackQueue {
    items: Vec<IdleWorker>,
}

impl StackQueue {
    pub(crate) fn new() -> Self {
        Self { items: Vec::new() }
    }
}

impl WorkerQueue for StackQueue {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn insert(&mut self, worker: IdleWorker) -> Result<(), PoolError> {
        self.items.push(worker);
        Ok(())
    }

    fn detach(&mut self) -> Option<IdleWorker> {
        self.items.pop()
    }

    fn retrieve_expired(&mut self, cutoff: Instant) -> Vec<IdleWorker> {
        // Recycle times are non-decreasing, so the expired set is the prefix
        // up to the partition point. Ties with the cutoff count as expired.
        let expired = self.items.partition_point(|w| w.recycled_at <= cutoff);
        self.items.drain(..expired).collect()
    }

    fn reset(&mut self) {
        for worker in self.items.drain(..) {
            let _ = worker.task_tx.send(None);
        }
    }
}
