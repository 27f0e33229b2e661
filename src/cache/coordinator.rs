//! Refresh Coordinator Module
//!
//! Elects at most one caller per refresh window to recompute a key set ahead
//! of expiry. The election is a single set-if-not-exists with TTL on the lock
//! store; losers, and every caller when the lock store is unreachable, take
//! the ordinary read-through path.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::accessor::{expiry_secs, validate_keys};
use crate::cache::batch::run_compute;
use crate::cache::{BatchAccessor, Compute, ResultMap};
use crate::error::Result;
use crate::store::{CacheStore, LockStore};

// == Refresh Role ==
/// Which branch a `fetch_with_refresh` call took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshRole {
    /// Won the refresh window and recomputed the full key set
    Refresher,
    /// Lost the window, or the lock store was unreachable, and read through
    Deferred,
}

// == Refresh Coordinator ==
/// Refresh-ahead wrapper around a [`BatchAccessor`].
pub struct RefreshCoordinator<S, L> {
    accessor: BatchAccessor<S>,
    lock_store: Arc<L>,
}

impl<S, L> Clone for RefreshCoordinator<S, L> {
    fn clone(&self) -> Self {
        Self {
            accessor: self.accessor.clone(),
            lock_store: Arc::clone(&self.lock_store),
        }
    }
}

impl<S: CacheStore, L: LockStore> RefreshCoordinator<S, L> {
    // == Constructor ==
    pub fn new(accessor: BatchAccessor<S>, lock_store: Arc<L>) -> Self {
        Self {
            accessor,
            lock_store,
        }
    }

    pub fn accessor(&self) -> &BatchAccessor<S> {
        &self.accessor
    }

    // == Fetch With Refresh ==
    /// Resolves `keys`, recomputing all of them if this caller wins the
    /// refresh window for `refresh_key`.
    ///
    /// The winner calls `compute` with the full key set, writes everything it
    /// returns with `expiry` and skips the cache read entirely. Everyone else
    /// gets [`BatchAccessor::fetch_batch`] with the same arguments.
    ///
    /// `refresh_interval` is the lock TTL and is independent of `expiry`;
    /// keep it shorter so values are refreshed before readers see them expire.
    ///
    /// # Arguments
    /// * `refresh_key` - Lock key naming the refresh window
    /// * `refresh_interval` - How long a won election blocks other refreshers
    /// * `keys` - The keys to resolve
    /// * `expiry` - Expiry applied to every value written
    /// * `compute` - Origin computation
    pub async fn fetch_with_refresh(
        &self,
        refresh_key: &str,
        refresh_interval: Duration,
        keys: &HashSet<String>,
        expiry: Duration,
        compute: &dyn Compute,
    ) -> Result<ResultMap> {
        self.fetch_with_refresh_role(refresh_key, refresh_interval, keys, expiry, compute)
            .await
            .map(|(_, results)| results)
    }

    /// Same as [`Self::fetch_with_refresh`], also reporting whether this
    /// caller was the refresher.
    ///
    /// An empty key set never attempts the election and reports `Deferred`.
    pub async fn fetch_with_refresh_role(
        &self,
        refresh_key: &str,
        refresh_interval: Duration,
        keys: &HashSet<String>,
        expiry: Duration,
        compute: &dyn Compute,
    ) -> Result<(RefreshRole, ResultMap)> {
        if keys.is_empty() {
            return Ok((RefreshRole::Deferred, ResultMap::new()));
        }
        validate_keys(keys)?;
        let lock_ttl = expiry_secs(refresh_interval)?;
        let ttl_secs = expiry_secs(expiry)?;

        if !self.try_elect(refresh_key, lock_ttl).await {
            debug!("Refresh window '{}' held elsewhere, reading through", refresh_key);
            let results = self.accessor.fetch_batch(keys, expiry, Some(compute)).await?;
            return Ok((RefreshRole::Deferred, results));
        }

        debug!(
            "Elected refresher for '{}', recomputing {} keys",
            refresh_key,
            keys.len()
        );
        let results = run_compute(compute, keys).await?;
        self.accessor.write_back(&results, ttl_secs).await;
        Ok((RefreshRole::Refresher, results))
    }

    /// Attempts to take the refresh window. Lock store failures count as a loss.
    async fn try_elect(&self, refresh_key: &str, lock_ttl: u64) -> bool {
        match self
            .lock_store
            .set_if_not_exists_with_expiry(refresh_key, lock_ttl)
            .await
        {
            Ok(acquired) => acquired,
            Err(e) => {
                warn!(
                    "Lock store unavailable for '{}', falling back to read-through: {}",
                    refresh_key, e
                );
                false
            }
        }
    }
}
