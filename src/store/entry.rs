//! Store Entry Module
//!
//! Defines the structure for entries held by the in-memory store.

use std::time::{SystemTime, UNIX_EPOCH};

// == Store Entry ==
/// A single stored value with its expiry.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// The stored payload
    pub value: String,
    /// Last write timestamp (Unix milliseconds)
    pub written_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl StoreEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl_seconds` from now.
    pub fn new(value: impl Into<String>, ttl_seconds: u64) -> Self {
        let now = current_timestamp_ms();

        Self {
            value: value.into(),
            written_at: now,
            expires_at: now.saturating_add(ttl_seconds.saturating_mul(1000)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches `expires_at`, so a
    /// TTL that has fully elapsed is never served.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
