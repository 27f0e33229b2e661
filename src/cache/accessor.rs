//! Batch Accessor Module
//!
//! Read-through access to the remote cache for a whole key set at once.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::batch::run_compute;
use crate::cache::{AbsentOnly, Compute, MissPredicate, ResultMap, MAX_KEY_LENGTH};
use crate::error::{CacheError, Result, StoreError};
use crate::store::CacheStore;

// == Batch Accessor ==
/// Stateless read-through accessor over a shared cache store.
///
/// Holds only its injected store handle, miss policy and a write failure
/// counter shared by all clones, so one instance can serve any number of
/// concurrent callers.
pub struct BatchAccessor<S> {
    store: Arc<S>,
    miss_predicate: Arc<dyn MissPredicate>,
    write_failures: Arc<AtomicU64>,
}

impl<S> Clone for BatchAccessor<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            miss_predicate: Arc::clone(&self.miss_predicate),
            write_failures: Arc::clone(&self.write_failures),
        }
    }
}

impl<S: CacheStore> BatchAccessor<S> {
    // == Constructor ==
    /// Creates an accessor that treats only unset keys as misses.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            miss_predicate: Arc::new(AbsentOnly),
            write_failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Replaces the miss policy applied to values that were found.
    pub fn with_miss_predicate(mut self, predicate: impl MissPredicate + 'static) -> Self {
        self.miss_predicate = Arc::new(predicate);
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Total cache writes rejected by the store since construction, across
    /// this accessor and every clone of it.
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    // == Fetch Batch ==
    /// Resolves `keys` from the cache, computing the misses in one callback.
    ///
    /// 1. One bulk read for every key.
    /// 2. Values the miss predicate accepts are returned and re-written with
    ///    `expiry`, so reading a value extends its life.
    /// 3. Remaining keys go to `compute` in a single call; whatever it writes
    ///    is persisted with `expiry` and returned.
    ///
    /// Keys nobody resolves are absent from the result. Read failures and
    /// compute failures are returned as errors; write failures are logged and
    /// the value is still returned.
    ///
    /// # Arguments
    /// * `keys` - The keys to resolve
    /// * `expiry` - Expiry applied to every value written back
    /// * `compute` - Origin for missing keys; None leaves misses unresolved
    pub async fn fetch_batch(
        &self,
        keys: &HashSet<String>,
        expiry: Duration,
        compute: Option<&dyn Compute>,
    ) -> Result<ResultMap> {
        if keys.is_empty() {
            return Ok(ResultMap::new());
        }
        validate_keys(keys)?;
        let ttl_secs = expiry_secs(expiry)?;

        let ordered: Vec<String> = keys.iter().cloned().collect();
        let values = self
            .store
            .read_many(&ordered)
            .await
            .map_err(CacheError::StoreRead)?;

        if values.len() != ordered.len() {
            return Err(CacheError::StoreRead(StoreError::Backend(format!(
                "bulk read returned {} values for {} keys",
                values.len(),
                ordered.len()
            ))));
        }

        let mut results = ResultMap::with_capacity(ordered.len());
        let mut misses = HashSet::new();
        for (key, value) in ordered.into_iter().zip(values) {
            match value {
                Some(value) if !self.miss_predicate.is_miss(&key, &value) => {
                    results.insert(key, value);
                }
                _ => {
                    misses.insert(key);
                }
            }
        }

        debug!(
            "fetch_batch: {} hits, {} misses",
            results.len(),
            misses.len()
        );

        // Reading extends life
        self.write_back(&results, ttl_secs).await;

        if misses.is_empty() {
            return Ok(results);
        }

        let Some(compute) = compute else {
            return Ok(results);
        };

        let computed = run_compute(compute, &misses).await?;
        self.write_back(&computed, ttl_secs).await;
        results.extend(computed);

        Ok(results)
    }

    // == Write Back ==
    /// Writes `values` through to the store and adds any rejected writes to
    /// the failure counter.
    pub(crate) async fn write_back(&self, values: &ResultMap, ttl_secs: u64) -> usize {
        let failures = write_through(self.store.as_ref(), values, ttl_secs).await;
        if failures > 0 {
            self.write_failures.fetch_add(failures as u64, Ordering::Relaxed);
            debug!("{} of {} cache writes failed", failures, values.len());
        }
        failures
    }
}

// == Write Through ==
/// Persists every entry of `values` with `ttl_secs`, returning the failure count.
///
/// Failures are logged and never remove a value from the caller's result.
pub(crate) async fn write_through<S>(store: &S, values: &ResultMap, ttl_secs: u64) -> usize
where
    S: CacheStore + ?Sized,
{
    let mut failures = 0;
    for (key, value) in values {
        if let Err(e) = store.write_with_expiry(key, value, ttl_secs).await {
            failures += 1;
            warn!("Cache write for key '{}' failed, value still returned: {}", key, e);
        }
    }
    failures
}

/// Converts `expiry` to whole seconds, rounding up and saturating at
/// `u64::MAX`. Zero is rejected.
pub(crate) fn expiry_secs(expiry: Duration) -> Result<u64> {
    if expiry.is_zero() {
        return Err(CacheError::InvalidRequest(
            "Expiry must be greater than zero".to_string(),
        ));
    }
    let secs = expiry.as_secs();
    Ok(if expiry.subsec_nanos() > 0 { secs.saturating_add(1) } else { secs })
}

pub(crate) fn validate_keys(keys: &HashSet<String>) -> Result<()> {
    match keys.iter().find(|key| key.len() > MAX_KEY_LENGTH) {
        Some(key) => Err(CacheError::InvalidRequest(format!(
            "Key '{}...' exceeds maximum length of {} bytes",
            key.chars().take(32).collect::<String>(),
            MAX_KEY_LENGTH
        ))),
        None => Ok(()),
    }
}
