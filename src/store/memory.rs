//! In-Memory Store Module
//!
//! Process-local implementation of both store interfaces with per-entry TTL.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::{CacheStore, LockStore, StoreEntry, StoreStats, LOCK_FLAG};

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, StoreEntry>,
    stats: StoreStats,
}

// == Memory Store ==
/// Shared in-memory key/value store.
///
/// Every operation takes the write lock, so `set_if_not_exists_with_expiry`
/// is atomic with respect to all other callers sharing the same instance.
/// Expired entries read as absent and are dropped lazily or by
/// `cleanup_expired`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Time To Live ==
    /// Remaining TTL of `key`, or None if absent or expired.
    pub async fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let inner = self.inner.read().await;
        inner
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| Duration::from_millis(entry.ttl_remaining_ms()))
    }

    /// Reads a single unexpired value without touching the statistics.
    pub async fn peek(&self, key: &str) -> Option<String> {
        let inner = self.inner.read().await;
        inner
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    // == Stats ==
    /// Returns current store statistics.
    pub async fn stats(&self) -> StoreStats {
        let inner = self.inner.read().await;
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired());
        let remaining = inner.entries.len();
        inner.stats.set_total_entries(remaining);
        before - remaining
    }

    // == Length ==
    /// Number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn read_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        let mut inner = self.inner.write().await;

        let values: Vec<Option<String>> = keys
            .iter()
            .map(|key| {
                inner
                    .entries
                    .get(key)
                    .filter(|entry| !entry.is_expired())
                    .map(|entry| entry.value.clone())
            })
            .collect();

        let present = values.iter().filter(|v| v.is_some()).count();
        inner.stats.record_bulk_read(keys.len(), present);
        Ok(values)
    }

    async fn write_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .entries
            .insert(key.to_string(), StoreEntry::new(value, ttl_secs));
        inner.stats.record_write();
        let count = inner.entries.len();
        inner.stats.set_total_entries(count);
        Ok(())
    }
}

#[async_trait]
impl LockStore for MemoryStore {
    async fn set_if_not_exists_with_expiry(
        &self,
        key: &str,
        ttl_secs: u64,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;

        let held = inner
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired());
        if !held {
            inner
                .entries
                .insert(key.to_string(), StoreEntry::new(LOCK_FLAG, ttl_secs));
        }

        inner.stats.record_lock_attempt(!held);
        let count = inner.entries.len();
        inner.stats.set_total_entries(count);
        Ok(!held)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|k| k.to_string()).collect()
    }

    #[tokio::test]
    async fn test_store_new() {
        let store = MemoryStore::new();
        assert_eq!(store.len().await, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_read_many_is_positional() {
        let store = MemoryStore::new();
        store.write_with_expiry("b", "2", 60).await.unwrap();

        let values = store.read_many(&keys(&["a", "b", "c"])).await.unwrap();
        assert_eq!(values, vec![None, Some("2".to_string()), None]);

        let stats = store.stats().await;
        assert_eq!(stats.bulk_reads, 1);
        assert_eq!(stats.keys_read, 3);
        assert_eq!(stats.keys_present, 1);
    }

    #[tokio::test]
    async fn test_empty_value_is_present() {
        let store = MemoryStore::new();
        store.write_with_expiry("blank", "", 60).await.unwrap();

        let values = store.read_many(&keys(&["blank"])).await.unwrap();
        assert_eq!(values, vec![Some(String::new())]);
    }

    #[tokio::test]
    async fn test_write_overwrites_and_resets_ttl() {
        let store = MemoryStore::new();
        store.write_with_expiry("k", "old", 5).await.unwrap();
        store.write_with_expiry("k", "new", 100).await.unwrap();

        assert_eq!(store.peek("k").await.as_deref(), Some("new"));
        assert!(store.ttl_remaining("k").await.unwrap() > Duration::from_secs(5));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_value_reads_as_absent() {
        let store = MemoryStore::new();
        store.write_with_expiry("k", "v", 1).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;

        let values = store.read_many(&keys(&["k"])).await.unwrap();
        assert_eq!(values, vec![None]);
        assert!(store.ttl_remaining("k").await.is_none());
    }

    #[tokio::test]
    async fn test_set_if_not_exists() {
        let store = MemoryStore::new();

        assert!(store.set_if_not_exists_with_expiry("lock", 60).await.unwrap());
        assert!(!store.set_if_not_exists_with_expiry("lock", 60).await.unwrap());

        let stats = store.stats().await;
        assert_eq!(stats.lock_attempts, 2);
        assert_eq!(stats.locks_acquired, 1);
    }

    #[tokio::test]
    async fn test_set_if_not_exists_after_expiry() {
        let store = MemoryStore::new();

        assert!(store.set_if_not_exists_with_expiry("lock", 1).await.unwrap());
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(store.set_if_not_exists_with_expiry("lock", 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let store = MemoryStore::new();
        store.write_with_expiry("short", "v", 1).await.unwrap();
        store.write_with_expiry("long", "v", 60).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(store.cleanup_expired().await, 1);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.peek("long").await.as_deref(), Some("v"));
    }
}
