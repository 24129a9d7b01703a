//! src/pool/mod.rs
//!
//! This module implements the worker pool.
//!
//! The pool accepts nullary tasks from any number of concurrent producers and
//! runs them on a bounded, reusable set of long-lived worker threads. Workers
//! that sit idle longer than the configured expiry are retired by a
//! background reaper, and their channel objects are recycled through a free
//! list so a busy pool stops allocating.
//!
//! # Architecture Overview
//!
//! ```text
//!   producers ──► Pool::submit ──► retrieve_worker
//!                                   │
//!                     ┌─────────────┼──────────────────┐
//!                     │ detach idle │ spawn below cap   │ park on condvar
//!                     ▼             ▼                   ▼
//!               ┌───────────┐  ┌─────────┐      woken by revert /
//!               │ WorkerQueue│  │ Worker  │      reaper broadcast
//!               │ stack|ring │  │ thread  │
//!               └─────┬─────┘  └────┬────┘
//!                     ▲             │ task channel (1 slot)
//!                     │ revert      ▼
//!                     └──────── execute, catch panic
//!
//!   reaper thread: every expiry period, binary-search the queue for workers
//!   idle past the cutoff, signal them to exit, and broadcast the condvar
//!   when the running count reaches zero.
//! ```
//!
//! # Module Structure
//!
//! ```text
//! src/pool/
//! ├── mod.rs          # Public API exports + module-level architecture docs
//! ├── config.rs       # PoolConfig, builder, and defaults
//! ├── controller.rs   # Pool handle, dispatch/revert protocol, reaper
//! ├── worker.rs       # Worker thread loop and task channel
//! ├── cache.rs        # Free list recycling worker channels
//! └── queue/
//!     ├── mod.rs      # WorkerQueue trait and IdleWorker
//!     ├── stack.rs    # Growable LIFO storage for lazy pools
//!     └── ring.rs     # Fixed-capacity ring for pre-allocated pools
//! ```
//!
//! # Example
//!
//! ```ignore
//! let pool = Pool::new(8)?;
//! for _ in 0..100 {
//!     pool.submit(|| do_work())?;
//! }
//! pool.release();
//! ```

mod cache;
mod config;
mod controller;
mod queue;
mod worker;

pub use config::{PanicHandler, PoolConfig, PoolConfigBuilder};
pub use controller::Pool;
