//! Store Statistics Module
//!
//! Tracks round trips and lock outcomes observed by the in-memory store.

use serde::Serialize;

// == Store Stats ==
/// Counters for store traffic.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    /// Number of bulk read round trips
    pub bulk_reads: u64,
    /// Number of keys requested across all bulk reads
    pub keys_read: u64,
    /// Number of requested keys that were present and unexpired
    pub keys_present: u64,
    /// Number of value writes
    pub writes: u64,
    /// Number of set-if-not-exists attempts
    pub lock_attempts: u64,
    /// Number of set-if-not-exists attempts that created the key
    pub locks_acquired: u64,
    /// Current number of stored entries, expired or not
    pub total_entries: usize,
}

impl StoreStats {
    // == Constructor ==
    /// Creates a new StoreStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Presence Rate ==
    /// Fraction of requested keys that were present, or 0.0 if nothing was read.
    pub fn presence_rate(&self) -> f64 {
        if self.keys_read == 0 {
            0.0
        } else {
            self.keys_present as f64 / self.keys_read as f64
        }
    }

    /// Records one bulk read of `requested` keys, `present` of which were found.
    pub fn record_bulk_read(&mut self, requested: usize, present: usize) {
        self.bulk_reads += 1;
        self.keys_read += requested as u64;
        self.keys_present += present as u64;
    }

    pub fn record_write(&mut self) {
        self.writes += 1;
    }

    /// Records a set-if-not-exists attempt and whether it won.
    pub fn record_lock_attempt(&mut self, acquired: bool) {
        self.lock_attempts += 1;
        if acquired {
            self.locks_acquired += 1;
        }
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
