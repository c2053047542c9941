//! Request-path health memoization. Not a background poller: refresh only happens when a
//! reader observes a stale or missing entry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use search_resilience_core::provider::CacheProvider;
use search_resilience_core::types::HealthStatus;

#[derive(Clone, Debug)]
struct HealthCacheEntry {
    status: HealthStatus,
    fetched_at: Instant,
}

/// Wraps one [`CacheProvider`]'s `check_health`, memoizing the result for `ttl`.
pub struct HealthCache {
    provider: Arc<dyn CacheProvider>,
    ttl: Duration,
    entry: RwLock<Option<HealthCacheEntry>>,
}

impl HealthCache {
    pub fn new(provider: Arc<dyn CacheProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            entry: RwLock::new(None),
        }
    }

    /// Returns the memoized status, refreshing it if stale or absent. On a failed refresh,
    /// falls back to the last known-good entry, or synthesizes an unhealthy status if there
    /// is none.
    pub async fn status(&self) -> HealthStatus {
        if let Some(status) = self.fresh_entry().await {
            return status;
        }
        self.refresh().await
    }

    /// Resets the cached entry's age so the next `status()` call refreshes unconditionally.
    pub async fn force_refresh(&self) -> HealthStatus {
        *self.entry.write().await = None;
        self.refresh().await
    }

    async fn fresh_entry(&self) -> Option<HealthStatus> {
        let guard = self.entry.read().await;
        let entry = guard.as_ref()?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.status.clone())
        } else {
            None
        }
    }

    async fn refresh(&self) -> HealthStatus {
        match self.provider.check_health().await {
            Ok(status) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(connected = status.is_connected, "refreshed cache health");

                *self.entry.write().await = Some(HealthCacheEntry {
                    status: status.clone(),
                    fetched_at: Instant::now(),
                });
                status
            }
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %_err, "cache health check failed");

                let guard = self.entry.read().await;
                match guard.as_ref() {
                    Some(stale) => stale.status.clone(),
                    None => HealthStatus::unhealthy("health check failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use search_resilience_core::error::Result;
    use search_resilience_core::provider::DatabaseProvider;
    use search_resilience_core::types::{SearchOptions, SearchResult};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingProvider {
        calls: AtomicU32,
        healthy: bool,
    }

    #[async_trait]
    impl DatabaseProvider for CountingProvider {
        async fn connect(&self) -> Result<()> {
            Ok(())
        }
        async fn disconnect(&self) -> Result<()> {
            Ok(())
        }
        fn is_connected(&self) -> bool {
            true
        }
        async fn search(&self, _query: &str, _opts: &SearchOptions) -> Result<Vec<SearchResult>> {
            Ok(vec![])
        }
        async fn check_health(&self) -> Result<HealthStatus> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(HealthStatus {
                is_connected: self.healthy,
                is_search_available: self.healthy,
                latency_ms: 5,
                errors: vec![],
            })
        }
    }

    #[async_trait]
    impl CacheProvider for CountingProvider {
        async fn get(&self, _key: &str) -> Result<Option<Vec<SearchResult>>> {
            Ok(None)
        }
        async fn set(&self, _key: &str, _value: Vec<SearchResult>, _ttl_ms: Option<u64>) -> Result<()> {
            Ok(())
        }
        async fn delete(&self, _key: &str) -> Result<()> {
            Ok(())
        }
        async fn clear(&self, _pattern: Option<&str>) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn refreshes_only_once_within_ttl() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicU32::new(0),
            healthy: true,
        });
        let cache = HealthCache::new(provider.clone(), Duration::from_millis(50));

        cache.status().await;
        cache.status().await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn force_refresh_bypasses_ttl() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicU32::new(0),
            healthy: true,
        });
        let cache = HealthCache::new(provider.clone(), Duration::from_secs(60));

        cache.status().await;
        cache.force_refresh().await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }
}
