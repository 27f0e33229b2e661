//! Configuration Module
//!
//! Handles loading store endpoints and cache timings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default expiry in seconds for values written to the remote cache (one day).
pub const DEFAULT_EXPIRY_SECS: u64 = 86_400;

/// Runtime configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Expiry in seconds applied to cached values
    pub default_expiry: u64,
    /// Lock TTL in seconds, i.e. how often one caller is elected to refresh
    pub refresh_interval: u64,
    /// Remote cache endpoint; None selects the in-memory store
    pub redis_url: Option<String>,
    /// Lock store endpoint; None reuses `redis_url`
    pub lock_redis_url: Option<String>,
    /// Per-command store timeout in milliseconds
    pub store_timeout_ms: u64,
    /// In-memory expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Number of concurrent callers the demo binary simulates
    pub demo_callers: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_EXPIRY` - Value expiry in seconds (default: 86400)
    /// - `REFRESH_INTERVAL` - Refresh window in seconds (default: 300)
    /// - `REDIS_URL` - Remote cache URL (default: unset, in-memory)
    /// - `LOCK_REDIS_URL` - Lock store URL (default: `REDIS_URL`)
    /// - `STORE_TIMEOUT_MS` - Store command timeout (default: 1000)
    /// - `CLEANUP_INTERVAL` - In-memory sweep frequency in seconds (default: 1)
    /// - `DEMO_CALLERS` - Simulated concurrent callers (default: 8)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let redis_url = env_string("REDIS_URL");
        let lock_redis_url = env_string("LOCK_REDIS_URL").or_else(|| redis_url.clone());

        Self {
            default_expiry: env_parse("DEFAULT_EXPIRY").unwrap_or(defaults.default_expiry),
            refresh_interval: env_parse("REFRESH_INTERVAL").unwrap_or(defaults.refresh_interval),
            redis_url,
            lock_redis_url,
            store_timeout_ms: env_parse("STORE_TIMEOUT_MS").unwrap_or(defaults.store_timeout_ms),
            cleanup_interval: env_parse("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            demo_callers: env_parse("DEMO_CALLERS").unwrap_or(defaults.demo_callers),
        }
    }

    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.default_expiry)
    }

    pub fn refresh_window(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_expiry: DEFAULT_EXPIRY_SECS,
            refresh_interval: 300,
            redis_url: None,
            lock_redis_url: None,
            store_timeout_ms: 1000,
            cleanup_interval: 1,
            demo_callers: 8,
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_expiry, 86_400);
        assert_eq!(config.refresh_interval, 300);
        assert!(config.redis_url.is_none());
        assert!(config.lock_redis_url.is_none());
        assert_eq!(config.store_timeout(), Duration::from_secs(1));
        assert_eq!(config.demo_callers, 8);
    }

    #[test]
    fn test_config_from_env() {
        // Single test touches the environment to avoid races between tests
        env::remove_var("DEFAULT_EXPIRY");
        env::remove_var("LOCK_REDIS_URL");
        env::set_var("REFRESH_INTERVAL", "not-a-number");
        env::set_var("REDIS_URL", "redis://cache.internal:6379");
        env::set_var("STORE_TIMEOUT_MS", "250");

        let config = Config::from_env();
        assert_eq!(config.default_expiry, DEFAULT_EXPIRY_SECS);
        assert_eq!(config.refresh_interval, 300);
        assert_eq!(
            config.redis_url.as_deref(),
            Some("redis://cache.internal:6379")
        );
        assert_eq!(config.lock_redis_url, config.redis_url);
        assert_eq!(config.store_timeout(), Duration::from_millis(250));

        env::remove_var("REFRESH_INTERVAL");
        env::remove_var("REDIS_URL");
        env::remove_var("STORE_TIMEOUT_MS");
    }
}
