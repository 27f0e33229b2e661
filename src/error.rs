//! Error types for the refresh-ahead cache layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Store Error Enum ==
/// Failure reported by a cache or lock store client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store could not be reached
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Store did not answer within the configured timeout
    #[error("Store operation timed out")]
    Timeout,

    /// Store answered with an error or an unexpected reply
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error()
        {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Backend(err.to_string())
        }
    }
}

// == Cache Error Enum ==
/// Error surfaced to callers of the accessor and coordinator.
///
/// Lock store failures never appear here: they degrade to the read-through path.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Bulk read from the remote cache failed
    #[error("Cache store read failed: {0}")]
    StoreRead(StoreError),

    /// Caller-supplied compute step failed
    #[error("Compute callback failed: {0:#}")]
    Compute(anyhow::Error),

    /// Invalid arguments
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_read_display() {
        let err = CacheError::StoreRead(StoreError::Timeout);
        assert_eq!(
            err.to_string(),
            "Cache store read failed: Store operation timed out"
        );
    }

    #[test]
    fn test_compute_display_includes_context() {
        let source = anyhow::anyhow!("origin down").context("loading profiles");
        let err = CacheError::Compute(source);
        let msg = err.to_string();
        assert!(msg.contains("loading profiles"));
        assert!(msg.contains("origin down"));
    }
}
