//! Public facade composing the routing engine with the optional governance layer. This is
//! the crate applications depend on; [`search_resilience_router`] and
//! [`search_resilience_governance`] stay usable standalone for callers who only need one of
//! the two.

use std::sync::Arc;

use search_resilience_core::error::Result;
use search_resilience_core::provider::{CacheProvider, DatabaseProvider};
use search_resilience_core::types::{SearchOptions, SearchResponse};
use search_resilience_governance::{GovernanceConfig, GovernanceLayer, SecureSearchResponse, SecurityContext};
pub use search_resilience_router::{RouterConfig, RouterConfigBuilder};
use search_resilience_router::{Router, SearchStats};

/// Entry point: one instance per provider pair. Cheap to clone-share via `Arc` across
/// request handlers since `Router` and `GovernanceLayer` hold no per-request state.
pub struct SearchResilience {
    router: Router,
    governance: Option<GovernanceLayer>,
}

impl SearchResilience {
    pub fn builder(database: Arc<dyn DatabaseProvider>) -> SearchResilienceBuilder {
        SearchResilienceBuilder::new(database)
    }

    /// See [`search_resilience_router::Router::search`].
    pub async fn search(&self, query: &str, opts: &SearchOptions) -> Result<SearchResponse> {
        self.router.search(query, opts).await
    }

    /// See [`search_resilience_router::Router::hybrid_search`].
    pub async fn hybrid_search(&self, query: &str, opts: &SearchOptions) -> Result<SearchResponse> {
        self.router.hybrid_search(query, opts).await
    }

    /// Runs `search` under the configured [`GovernanceLayer`]. Returns
    /// `SecurityAccessDenied` if no governance layer was configured, since calling
    /// `secureSearch` without a policy would silently skip every protection it implies.
    pub async fn secure_search(
        &self,
        ctx: &SecurityContext,
        query: &str,
        opts: SearchOptions,
    ) -> Result<SecureSearchResponse> {
        let Some(governance) = &self.governance else {
            return Err(search_resilience_core::SearchError::SecurityAccessDenied(
                "no governance layer configured".into(),
            ));
        };

        let router = &self.router;
        governance
            .secure_search(ctx, query, opts, |query, opts| async move { router.search(&query, &opts).await })
            .await
    }

    pub async fn get_cache_health(&self) -> Option<search_resilience_core::types::HealthStatus> {
        self.router.get_cache_health().await
    }

    pub async fn force_health_check(&self) -> Option<search_resilience_core::types::HealthStatus> {
        self.router.force_health_check().await
    }

    pub async fn get_search_stats(&self) -> SearchStats {
        self.router.get_search_stats().await
    }

    pub async fn clear_cache(&self, pattern: Option<&str>) -> Result<()> {
        self.router.clear_cache(pattern).await
    }
}

pub struct SearchResilienceBuilder {
    database: Arc<dyn DatabaseProvider>,
    cache: Option<Arc<dyn CacheProvider>>,
    router_config: RouterConfig,
    governance_config: Option<GovernanceConfig>,
}

impl SearchResilienceBuilder {
    fn new(database: Arc<dyn DatabaseProvider>) -> Self {
        Self {
            database,
            cache: None,
            router_config: RouterConfig::default(),
            governance_config: None,
        }
    }

    pub fn cache(mut self, cache: Arc<dyn CacheProvider>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn router_config(mut self, config: RouterConfig) -> Self {
        self.router_config = config;
        self
    }

    pub fn governance(mut self, config: GovernanceConfig) -> Self {
        self.governance_config = Some(config);
        self
    }

    pub fn build(self) -> SearchResilience {
        SearchResilience {
            router: Router::new(self.database, self.cache, self.router_config),
            governance: self.governance_config.map(GovernanceLayer::new),
        }
    }
}
