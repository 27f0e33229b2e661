//! Refresh Ahead demo binary
//!
//! Simulates a herd of concurrent callers requesting the same key set through
//! a `RefreshCoordinator` and reports how many callers refreshed, how many
//! deferred, and how often the slow origin was hit.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use refresh_ahead::{
    spawn_cleanup_task, BatchAccessor, CacheError, CacheStore, Compute, Config, LockStore,
    MemoryStore, RedisStore, RefreshCoordinator, RefreshRole, WriteBatch,
};

const REFRESH_KEY: &str = "demo:refresh:catalog";
const ORIGIN_LATENCY: Duration = Duration::from_millis(250);

/// Main entry point for the refresh-ahead demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the cache and lock stores (Redis, or a shared in-memory store)
/// 4. Run two rounds of concurrent callers against a slow origin
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refresh_ahead=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting refresh-ahead demo");

    let config = Config::from_env();
    info!(
        "Configuration loaded: expiry={}s, refresh_interval={}s, callers={}, store_timeout={}ms",
        config.default_expiry, config.refresh_interval, config.demo_callers, config.store_timeout_ms
    );

    match config.redis_url.clone() {
        Some(url) => {
            let cache = RedisStore::connect(&url, config.store_timeout())
                .await
                .context("connecting to cache store")?;
            let lock_url = config.lock_redis_url.clone().unwrap_or(url);
            let locks = RedisStore::connect(&lock_url, config.store_timeout())
                .await
                .context("connecting to lock store")?;

            let coordinator =
                RefreshCoordinator::new(BatchAccessor::new(Arc::new(cache)), Arc::new(locks));
            run_demo(coordinator, &config).await?;
        }
        None => {
            info!("REDIS_URL not set, using in-memory store");
            let store = Arc::new(MemoryStore::new());
            let cleanup_handle = spawn_cleanup_task(store.clone(), config.cleanup_interval);

            let coordinator =
                RefreshCoordinator::new(BatchAccessor::new(store.clone()), store.clone());
            run_demo(coordinator, &config).await?;

            let stats = store.stats().await;
            info!("Store stats: {}", serde_json::to_string(&stats)?);
            cleanup_handle.abort();
        }
    }

    info!("Demo complete");
    Ok(())
}

/// Slow origin that counts its invocations.
struct SimulatedOrigin {
    calls: AtomicUsize,
}

#[async_trait]
impl Compute for SimulatedOrigin {
    async fn compute(&self, keys: &HashSet<String>, batch: &mut WriteBatch) -> anyhow::Result<()> {
        let generation = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(ORIGIN_LATENCY).await;
        for key in keys {
            batch.write(key.clone(), format!("{}@gen{}", key, generation));
        }
        Ok(())
    }
}

/// Runs two rounds of concurrent callers and logs the election split and
/// origin traffic per round.
async fn run_demo<S, L>(coordinator: RefreshCoordinator<S, L>, config: &Config) -> anyhow::Result<()>
where
    S: CacheStore + 'static,
    L: LockStore + 'static,
{
    let keys: Arc<HashSet<String>> =
        Arc::new((1..=5).map(|i| format!("demo:catalog:item:{}", i)).collect());
    let origin = Arc::new(SimulatedOrigin {
        calls: AtomicUsize::new(0),
    });

    for round in 1..=2 {
        let before = origin.calls.load(Ordering::SeqCst);
        let mut handles = Vec::with_capacity(config.demo_callers);

        for caller in 0..config.demo_callers {
            let coordinator = coordinator.clone();
            let keys = Arc::clone(&keys);
            let origin = Arc::clone(&origin);
            let expiry = config.expiry();
            let window = config.refresh_window();

            handles.push(tokio::spawn(async move {
                let (role, results) = coordinator
                    .fetch_with_refresh_role(REFRESH_KEY, window, &keys, expiry, origin.as_ref())
                    .await?;
                Ok::<_, CacheError>((caller, role, results.len()))
            }));
        }

        let mut elected = 0;
        let mut deferred = 0;
        for handle in handles {
            let (caller, role, resolved) = handle.await??;
            match role {
                RefreshRole::Refresher => elected += 1,
                RefreshRole::Deferred => deferred += 1,
            }
            debug!(
                "Round {}: caller {} ({:?}) resolved {} keys",
                round, caller, role, resolved
            );
        }

        info!(
            "Round {}: {} elected refresher, {} deferred, origin invoked {} times",
            round,
            elected,
            deferred,
            origin.calls.load(Ordering::SeqCst) - before
        );
    }

    let write_failures = coordinator.accessor().write_failures();
    if write_failures > 0 {
        warn!("{} cache writes failed during the demo", write_failures);
    }

    Ok(())
}
