//! src/pool/config.rs
//!
//! Configuration for pool behaviour.
//!
//! Example:
//! ```ignore
//! let config = PoolConfig::builder()
//!     .expiry_duration(Duration::from_secs(30))
//!     .max_blocking_tasks(64)
//!     .build();
//! let pool = Pool::with_config(16, config)?;
//! ```

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

/// Hook invoked on the worker thread with the payload recovered from a
/// panicked task. The handler itself must not panic.
pub type PanicHandler = Arc<dyn Fn(Box<dyn Any + Send>) + Send + Sync>;

/// Idle reap interval and threshold used when none is configured.
pub(crate) const DEFAULT_EXPIRY: Duration = Duration::from_secs(10);

/// Configuration for a [`Pool`](crate::Pool).
#[derive(Clone, Default)]
pub struct PoolConfig {
    /// How long a worker may sit idle before the reaper retires it, and how
    /// often the reaper runs. `Duration::ZERO` selects the 10 s default.
    pub expiry_duration: Duration,
    /// Pre-allocate idle-worker storage as a ring sized to the pool capacity.
    /// Requires a positive pool size and forbids `tune`.
    pub pre_alloc: bool,
    /// Upper bound on submitters simultaneously blocked waiting for a worker.
    /// 0 means unlimited.
    pub max_blocking_tasks: usize,
    /// Fail `submit` immediately instead of blocking when at capacity.
    pub nonblocking: bool,
    /// Hook for task panics. When unset, panics are reported through the
    /// `tracing` facade.
    pub panic_handler: Option<PanicHandler>,
}

impl PoolConfig {
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::default()
    }
}

/// Builder for PoolConfig with method chaining
#[derive(Default)]
pub struct PoolConfigBuilder {
    config: PoolConfig,
}

impl PoolConfigBuilder {
    /// Set the idle expiry. A worker idle longer than this is retired by the
    /// reaper, which also wakes on this period. Zero selects the default.
    pub fn expiry_duration(mut self, expiry: Duration) -> Self {
        self.config.expiry_duration = expiry;
        self
    }

    /// Pre-allocate the idle queue as a fixed ring.
    ///
    /// The ring is sized to the pool capacity, so construction rejects an
    /// unbounded size, and `tune` becomes a no-op.
    pub fn pre_alloc(mut self, pre_alloc: bool) -> Self {
        self.config.pre_alloc = pre_alloc;
        self
    }

    /// Cap how many submitters may block waiting for a free worker. Once the
    /// cap is reached further submissions fail with `PoolOverload`.
    ///
    /// 0 means unlimited blocked submitters (the default).
    pub fn max_blocking_tasks(mut self, max: usize) -> Self {
        self.config.max_blocking_tasks = max;
        self
    }

    /// Make `submit` return `PoolOverload` immediately when the pool is at
    /// capacity, instead of blocking until a worker frees up.
    pub fn nonblocking(mut self, nonblocking: bool) -> Self {
        self.config.nonblocking = nonblocking;
        self
    }

    /// Install a hook observing panics that escape submitted tasks. The
    /// worker survives the panic either way; the handler runs on the worker
    /// thread before it becomes eligible for new tasks.
    pub fn panic_handler(mut self, handler: PanicHandler) -> Self {
        self.config.panic_handler = Some(handler);
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> PoolConfig {
        self.config
    }
}
