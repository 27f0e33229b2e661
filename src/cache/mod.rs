//! Cache Module
//!
//! Batched read-through access to the remote cache and the refresh-ahead
//! coordinator layered on top of it.
//!
//! # Flow
//! - `RefreshCoordinator::fetch_with_refresh` tries to win the refresh lock;
//!   the winner recomputes every key, everyone else defers to
//! - `BatchAccessor::fetch_batch`, which reads all keys in one round trip and
//!   computes the misses in a single callback invocation

mod accessor;
mod batch;
mod coordinator;
mod predicate;

#[cfg(test)]
mod property_tests;

use std::collections::HashMap;

// Re-export public types
pub use accessor::BatchAccessor;
pub use batch::{compute_fn, Compute, FnCompute, WriteBatch};
pub use coordinator::{RefreshCoordinator, RefreshRole};
pub use predicate::{AbsentOnly, MissPredicate, SentinelMiss};

/// Resolved values keyed by cache key, as returned to callers.
pub type ResultMap = HashMap<String, String>;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 1024;
