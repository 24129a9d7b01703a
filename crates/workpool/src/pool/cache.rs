//! Free list recycling worker channel objects.
//!
//! A worker that exits hands its channel pair back here; the next spawn draws
//! from the list instead of allocating. This plays the allocation-amortizing
//! role across worker spawn/exit cycles and is not semantically required.

use std::sync::Mutex;

use super::worker::WorkerChannel;

pub(crate) struct WorkerCache {
    slots: Mutex<Vec<WorkerChannel>>,
}

impl WorkerCache {
    pub(crate) fn new() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
        }
    }

    /// Returns a recycled channel, or constructs a fresh one.
    pub(crate) fn get(&self) -> WorkerChannel {
        self.slots
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(WorkerChannel::new)
    }

    /// Stores an exited worker's channel for reuse. Channels arrive drained:
    /// the worker consumed the sentinel (or its last task) before exiting.
    pub(crate) fn put(&self, chan: WorkerChannel) {
        self.slots.lock().unwrap().push(chan);
    }
}
