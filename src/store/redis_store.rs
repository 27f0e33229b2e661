//! Redis Store Module
//!
//! Remote cache and lock store backed by a pooled Redis connection.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::info;

use crate::error::StoreError;
use crate::store::{CacheStore, LockStore, LOCK_FLAG};

// == Redis Store ==
/// Redis client implementing both store interfaces.
///
/// `ConnectionManager` multiplexes one reconnecting connection and is cheap to
/// clone, so a single `RedisStore` is built at startup and shared through an
/// `Arc` by every accessor and coordinator.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    timeout: Duration,
}

impl RedisStore {
    // == Constructor ==
    /// Connects to `url`, bounding the handshake and every later command by `timeout`.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = with_timeout(timeout, ConnectionManager::new(client)).await?;
        info!("Connected to redis store at {}", url);
        Ok(Self { conn, timeout })
    }
}

async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(_) => Err(StoreError::Timeout),
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn read_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("MGET");
        cmd.arg(keys);
        let values: Vec<Option<String>> =
            with_timeout(self.timeout, cmd.query_async(&mut conn)).await?;

        if values.len() != keys.len() {
            return Err(StoreError::Backend(format!(
                "MGET returned {} values for {} keys",
                values.len(),
                keys.len()
            )));
        }
        Ok(values)
    }

    async fn write_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("EX").arg(ttl_secs);
        let _: () = with_timeout(self.timeout, cmd.query_async(&mut conn)).await?;
        Ok(())
    }
}

#[async_trait]
impl LockStore for RedisStore {
    async fn set_if_not_exists_with_expiry(
        &self,
        key: &str,
        ttl_secs: u64,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(LOCK_FLAG).arg("NX").arg("EX").arg(ttl_secs);
        // "OK" when created, nil when the key already exists
        let reply: Option<String> =
            with_timeout(self.timeout, cmd.query_async(&mut conn)).await?;
        Ok(reply.is_some())
    }
}
