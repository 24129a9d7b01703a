pub mod error;
pub mod pool;

pub use error::PoolError;
pub use pool::{PanicHandler, Pool, PoolConfig, PoolConfigBuilder};
