//! Store Module
//!
//! Interfaces to the remote cache and the distributed lock store, plus the
//! backends that implement them.
//!
//! # Backends
//! - `MemoryStore`: in-process store with per-entry TTL, used by tests and
//!   single-node deployments
//! - `RedisStore`: pooled Redis connection, `MGET` / `SET EX` / `SET NX EX`

mod entry;
mod memory;
mod redis_store;
mod stats;

use async_trait::async_trait;

use crate::error::StoreError;

// Re-export public types
pub use entry::StoreEntry;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use stats::StoreStats;

/// Value stored in a refresh lock entry. Only its existence matters.
pub const LOCK_FLAG: &str = "1";

// == Cache Store ==
/// Remote key/value cache with per-key expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Reads all `keys` in one round trip.
    ///
    /// The result is positional: `result[i]` belongs to `keys[i]`, `None`
    /// meaning the key is unset or expired.
    async fn read_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError>;

    /// Writes `value` under `key`, expiring after `ttl_secs` seconds.
    async fn write_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<(), StoreError>;
}

// == Lock Store ==
/// Store offering an atomic set-if-not-exists with expiry.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Creates `key` with a flag value and `ttl_secs` expiry only if it does
    /// not exist. Returns whether this call created it.
    async fn set_if_not_exists_with_expiry(
        &self,
        key: &str,
        ttl_secs: u64,
    ) -> Result<bool, StoreError>;
}
