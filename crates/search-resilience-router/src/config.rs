//! Configuration for [`crate::Router`]: selector thresholds, retry policy, merge weights
//! and the cache breaker's thresholds, all in one builder.

use std::time::Duration;

use search_resilience_circuitbreaker::CircuitBreakerConfig;

use crate::cache_through::TtlPolicy;
use crate::merge::{MergeStrategy, MergeWeights};
use crate::retry::RetryConfig;
use crate::selector::SelectorConfig;

#[derive(Clone, Debug)]
pub struct RouterConfig {
    pub selector: SelectorConfig,
    pub retry: RetryConfig,
    pub merge_strategy: MergeStrategy,
    pub merge_weights: MergeWeights,
    pub cache_breaker: CircuitBreakerConfig,
    pub health_ttl: Duration,
    pub ttl_policy: TtlPolicy,
    pub hybrid_enabled: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            selector: SelectorConfig::default(),
            retry: RetryConfig::default(),
            merge_strategy: MergeStrategy::Weighted,
            merge_weights: MergeWeights::default(),
            cache_breaker: CircuitBreakerConfig::standard(),
            health_ttl: Duration::from_secs(30),
            ttl_policy: TtlPolicy::default(),
            hybrid_enabled: false,
        }
    }
}

impl RouterConfig {
    pub fn builder() -> RouterConfigBuilder {
        RouterConfigBuilder::default()
    }
}

#[derive(Clone, Debug, Default)]
pub struct RouterConfigBuilder {
    config: RouterConfig,
}

impl RouterConfigBuilder {
    pub fn selector(mut self, selector: SelectorConfig) -> Self {
        self.config.selector = selector;
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.config.merge_strategy = strategy;
        self
    }

    pub fn merge_weights(mut self, weights: MergeWeights) -> Self {
        self.config.merge_weights = weights;
        self
    }

    pub fn cache_breaker(mut self, breaker: CircuitBreakerConfig) -> Self {
        self.config.cache_breaker = breaker;
        self
    }

    pub fn health_ttl(mut self, ttl: Duration) -> Self {
        self.config.health_ttl = ttl;
        self
    }

    pub fn ttl_policy(mut self, policy: TtlPolicy) -> Self {
        self.config.ttl_policy = policy;
        self
    }

    pub fn hybrid_enabled(mut self, enabled: bool) -> Self {
        self.config.hybrid_enabled = enabled;
        self
    }

    pub fn build(self) -> RouterConfig {
        self.config
    }
}
