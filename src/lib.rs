//! Refresh Ahead - batched read-through cache access with refresh-ahead
//! coordination over a shared remote store.
//!
//! A [`BatchAccessor`] resolves a key set in one bulk read and computes all
//! misses in one callback. A [`RefreshCoordinator`] additionally elects one
//! caller per refresh window, via set-if-not-exists on a lock store, to
//! recompute the whole key set before it expires.

pub mod cache;
pub mod config;
pub mod error;
pub mod store;
pub mod tasks;

pub use cache::{
    compute_fn, BatchAccessor, Compute, MissPredicate, RefreshCoordinator, RefreshRole,
    ResultMap, SentinelMiss, WriteBatch,
};
pub use config::Config;
pub use error::{CacheError, Result, StoreError};
pub use store::{CacheStore, LockStore, MemoryStore, RedisStore};
pub use tasks::spawn_cleanup_task;
