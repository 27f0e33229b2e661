//! Write Batch Module
//!
//! The per-call buffer a compute callback fills, and the callback trait itself.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::cache::ResultMap;
use crate::error::{CacheError, Result};

// == Write Batch ==
/// Values produced by one compute invocation.
///
/// Owned by a single fetch call and consumed once its contents are persisted.
#[derive(Debug, Default)]
pub struct WriteBatch {
    values: HashMap<String, String>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    // == Write ==
    /// Records `value` for `key`. A second write to the same key replaces the first.
    pub fn write(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn into_values(self) -> ResultMap {
        self.values
    }
}

// == Compute ==
/// Origin computation invoked with the keys a fetch needs resolved.
///
/// Implementations write whatever they can resolve into `batch`; keys left
/// unwritten are simply absent from the fetch result.
#[async_trait]
pub trait Compute: Send + Sync {
    async fn compute(&self, keys: &HashSet<String>, batch: &mut WriteBatch) -> anyhow::Result<()>;
}

/// `Compute` adapter for a synchronous closure. Built with [`compute_fn`].
pub struct FnCompute<F>(F);

/// Wraps a closure so it can be passed wherever a `Compute` is expected.
///
/// ```ignore
/// let origin = compute_fn(|keys, batch| {
///     for key in keys {
///         batch.write(key.clone(), load(key)?);
///     }
///     Ok(())
/// });
/// ```
pub fn compute_fn<F>(f: F) -> FnCompute<F>
where
    F: Fn(&HashSet<String>, &mut WriteBatch) -> anyhow::Result<()> + Send + Sync,
{
    FnCompute(f)
}

#[async_trait]
impl<F> Compute for FnCompute<F>
where
    F: Fn(&HashSet<String>, &mut WriteBatch) -> anyhow::Result<()> + Send + Sync,
{
    async fn compute(&self, keys: &HashSet<String>, batch: &mut WriteBatch) -> anyhow::Result<()> {
        (self.0)(keys, batch)
    }
}

/// Invokes `compute` once for `keys` and returns everything it wrote.
///
/// A failed callback discards its partial batch.
pub(crate) async fn run_compute(compute: &dyn Compute, keys: &HashSet<String>) -> Result<ResultMap> {
    let mut batch = WriteBatch::new();
    compute
        .compute(keys, &mut batch)
        .await
        .map_err(CacheError::Compute)?;
    Ok(batch.into_values())
}
