//! Strategy selection, cache-through and hybrid execution, and result merging.
//!
//! [`Router`] is the engine behind the public `search` / `hybridSearch` entry points: it
//! owns the provider handles, the named circuit breaker protecting the cache dependency, and
//! the health cache, and wires them together per the component design (selector -> executor
//! -> provider contracts).

pub mod cache_through;
pub mod config;
pub mod hybrid;
pub mod merge;
pub mod retry;
pub mod selector;
pub mod stats;

pub use cache_through::TtlPolicy;
pub use config::{RouterConfig, RouterConfigBuilder};
pub use merge::{merge, MergeStrategy, MergeWeights};
pub use retry::RetryConfig;
pub use selector::{select_strategy, SelectorConfig};
pub use stats::SearchStats;

use std::sync::Arc;

use search_resilience_circuitbreaker::{Circuit, CircuitBreakerRegistry};
use search_resilience_core::error::Result;
use search_resilience_core::provider::{CacheProvider, DatabaseProvider};
use search_resilience_core::types::{
    HealthStatus, SearchOptions, SearchPath, SearchResponse, SearchStrategy,
};
use search_resilience_healthcheck::HealthCache;

const CACHE_BREAKER_NAME: &str = "cache";

/// The routing and resilience engine: one `Router` per provider pair.
pub struct Router {
    database: Arc<dyn DatabaseProvider>,
    cache: Option<Arc<dyn CacheProvider>>,
    breakers: CircuitBreakerRegistry,
    health_cache: Option<HealthCache>,
    config: RouterConfig,
}

impl Router {
    pub fn new(
        database: Arc<dyn DatabaseProvider>,
        cache: Option<Arc<dyn CacheProvider>>,
        config: RouterConfig,
    ) -> Self {
        let health_cache = cache
            .clone()
            .map(|provider| HealthCache::new(provider, config.health_ttl));

        Self {
            database,
            cache,
            breakers: CircuitBreakerRegistry::new(),
            health_cache,
            config,
        }
    }

    async fn cache_breaker(&self) -> Option<Arc<Circuit>> {
        if self.cache.is_none() {
            return None;
        }
        Some(
            self.breakers
                .get_or_create(CACHE_BREAKER_NAME, self.config.cache_breaker.clone())
                .await,
        )
    }

    async fn current_strategy(&self) -> SearchStrategy {
        let breaker = self.cache_breaker().await;
        let phase = match &breaker {
            Some(breaker) => Some(breaker.phase()),
            None => None,
        };
        let health = match &self.health_cache {
            Some(health_cache) => Some(health_cache.status().await),
            None => None,
        };

        select_strategy(self.cache.is_some(), phase, health.as_ref(), self.config.selector)
    }

    /// The main entry point: selects a strategy, executes the cache-through path, and falls
    /// back on primary failure. Never returns `Err` for routine provider failures -- both
    /// paths failing surfaces as an aggregated error only when there is nothing left to
    /// serve.
    pub async fn search(&self, query: &str, opts: &SearchOptions) -> Result<SearchResponse> {
        let strategy = self.current_strategy().await;
        let breaker = self.cache_breaker().await;

        let outcome = cache_through::execute(
            query,
            opts,
            &strategy,
            &self.database,
            self.cache.as_ref(),
            breaker.as_ref(),
            self.config.retry,
            self.config.ttl_policy,
        )
        .await?;

        Ok(SearchResponse {
            results: outcome.results,
            performance: outcome.performance,
            strategy: Some(strategy),
        })
    }

    /// Parallel cache+database fanout with merge. Falls back to [`Router::search`] when
    /// hybrid mode is disabled or no cache provider is configured.
    pub async fn hybrid_search(&self, query: &str, opts: &SearchOptions) -> Result<SearchResponse> {
        let Some(cache) = self.cache.as_ref().filter(|_| self.config.hybrid_enabled) else {
            return self.search(query, opts).await;
        };

        let breaker = self.cache_breaker().await;
        let outcome = hybrid::execute(
            query,
            opts,
            &self.database,
            cache,
            breaker.as_ref(),
            self.config.merge_strategy,
            self.config.merge_weights,
        )
        .await?;

        Ok(SearchResponse {
            results: outcome.results,
            performance: outcome.performance,
            strategy: Some(SearchStrategy {
                primary: SearchPath::Hybrid,
                fallback: SearchPath::Database,
                reason: "hybrid enabled".into(),
            }),
        })
    }

    pub async fn get_cache_health(&self) -> Option<HealthStatus> {
        match &self.health_cache {
            Some(health_cache) => Some(health_cache.status().await),
            None => None,
        }
    }

    pub async fn force_health_check(&self) -> Option<HealthStatus> {
        match &self.health_cache {
            Some(health_cache) => Some(health_cache.force_refresh().await),
            None => None,
        }
    }

    pub async fn get_search_stats(&self) -> SearchStats {
        let cache_health = self.get_cache_health().await;
        let database_health = self.database.check_health().await.ok();
        let circuit_breaker = match self.cache_breaker().await {
            Some(breaker) => Some(breaker.snapshot().await),
            None => None,
        };
        let recommended_strategy = self.current_strategy().await;

        SearchStats {
            cache_health,
            database_health,
            circuit_breaker,
            recommended_strategy,
        }
    }

    pub async fn clear_cache(&self, pattern: Option<&str>) -> Result<()> {
        match &self.cache {
            Some(cache) => cache.clear(pattern).await,
            None => Ok(()),
        }
    }
}
