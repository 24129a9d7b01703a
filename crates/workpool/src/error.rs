//! Error types returned by pool operations.
//!
//! Construction errors (`InvalidPreAllocSize`) must be corrected by the
//! caller. `PoolClosed` is terminal until a `reboot`. `PoolOverload` is
//! transient and safe to retry.

use thiserror::Error;

/// Errors surfaced by [`Pool`](crate::Pool) operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// The pool has been released; submissions are rejected until `reboot`.
    #[error("pool has been released")]
    PoolClosed,

    /// The pool is at capacity and no worker could be obtained, either
    /// because the pool is non-blocking or the blocking cap was hit.
    #[error("pool is at capacity and no idle worker is available")]
    PoolOverload,

    /// Pre-allocation was requested together with an unbounded size.
    #[error("pre-allocation requires a positive pool size")]
    InvalidPreAllocSize,

    /// A fixed-capacity idle queue refused an insert. Inserts only happen
    /// while `running <= capacity`, so hitting this indicates a bug; the
    /// refused worker terminates instead of corrupting pool state.
    #[error("idle worker queue is full")]
    QueueFull,
}
