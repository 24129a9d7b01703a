//! Fixed-capacity ring storage for idle workers.
//!
//! Used by pre-allocated pools: the ring is sized to the pool capacity once
//! and never grows. `head`/`tail` plus a `full` flag (head == tail is
//! otherwise ambiguous) track occupancy; expiry removal only advances the
//! head, so survivors are never moved.

use std::time::Instant;

use crate::error::PoolError;

use super::{IdleWorker, WorkerQueue};

pub(crate) struct RingQueue {
    items: Vec<Option<IdleWorker>>,
    head: usize,
    tail: usize,
    full: bool,
}

impl RingQueue {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut items = Vec::with_capacity(capacity);
        items.resize_with(capacity, || None);
        Self {
            items,
            head: 0,
            tail: 0,
            full: false,
        }
    }

    fn slot(&self, logical: usize) -> usize {
        (self.head + logical) % self.items.len()
    }

    /// Number of leading entries recycled at or before `cutoff`. Binary
    /// search over logical indices; valid because recycle times are
    /// non-decreasing from head to tail.
    fn expired_prefix(&self, cutoff: Instant) -> usize {
        let mut lo = 0;
        let mut hi = self.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let expired = self.items[self.slot(mid)]
                .as_ref()
                .is_some_and(|w| w.recycled_at <= cutoff);
            if expired {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

impl WorkerQueue for RingQueue {
    fn len(&self) -> usize {
        if self.full {
            self.items.len()
        } else if self.tail >= self.head {
            self.tail - self.head
        } else {
            self.items.len() - self.head + self.tail
        }
    }

    fn insert(&mut self, worker: IdleWorker) -> Result<(), PoolError> {
        if self.full {
            return Err(PoolError::QueueFull);
        }
        self.items[self.tail] = Some(worker);
        self.tail = (self.tail + 1) % self.items.len();
        self.full = self.tail == self.head;
        Ok(())
    }

    fn detach(&mut self) -> Option<IdleWorker> {
        if self.is_empty() {
            return None;
        }
        self.tail = (self.tail + self.items.len() - 1) % self.items.len();
        self.full = false;
        self.items[self.tail].take()
    }

    fn retrieve_expired(&mut self, cutoff: Instant) -> Vec<IdleWorker> {
        let expired = self.expired_prefix(cutoff);
        let mut removed = Vec::with_capacity(expired);
        for _ in 0..expired {
            if let Some(worker) = self.items[self.head].take() {
                removed.push(worker);
            }
            self.head = (self.head + 1) % self.items.len();
            self.full = false;
        }
        removed
    }

    fn reset(&mut self) {
        while let Some(worker) = self.detach() {
            let _ = worker.task_tx.send(None);
        }
        self.head = 0;
        self.tail = 0;
        self.full = false;
    }
}
