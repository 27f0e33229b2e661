//! Miss Predicate Module
//!
//! Decides whether a value read from the remote cache counts as present.
//! Absent keys are always misses; predicates only see values that exist.

// == Miss Predicate ==
/// Policy applied to every value returned by a bulk read.
///
/// Some backends cannot tell "never stored" from "stored empty", so
/// applications can mark a payload as a miss here and force recomputation.
pub trait MissPredicate: Send + Sync {
    /// Returns true if `value` read for `key` must be treated as absent.
    fn is_miss(&self, key: &str, value: &str) -> bool;
}

/// Default policy: every stored value is a hit, including empty ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsentOnly;

impl MissPredicate for AbsentOnly {
    fn is_miss(&self, _key: &str, _value: &str) -> bool {
        false
    }
}

/// Treats one sentinel payload as a miss.
#[derive(Debug, Clone, Default)]
pub struct SentinelMiss {
    sentinel: String,
}

impl SentinelMiss {
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
        }
    }

    /// Sentinel matching the empty payload.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl MissPredicate for SentinelMiss {
    fn is_miss(&self, _key: &str, value: &str) -> bool {
        value == self.sentinel
    }
}

impl<F> MissPredicate for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn is_miss(&self, key: &str, value: &str) -> bool {
        self(key, value)
    }
}
