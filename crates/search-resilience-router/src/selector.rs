//! Chooses primary/fallback execution paths from breaker phase and cached health.

use std::time::Duration;

use search_resilience_circuitbreaker::Phase;
use search_resilience_core::types::{HealthStatus, SearchPath, SearchStrategy};

/// Latency below which a connected, search-available cache is considered "fast enough"
/// to prefer over the database.
#[derive(Clone, Copy, Debug)]
pub struct SelectorConfig {
    pub fast_threshold: Duration,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            fast_threshold: Duration::from_millis(1000),
        }
    }
}

/// Picks a [`SearchStrategy`] from the decision table in the component design.
pub fn select_strategy(
    cache_configured: bool,
    breaker_phase: Option<Phase>,
    cache_health: Option<&HealthStatus>,
    config: SelectorConfig,
) -> SearchStrategy {
    if !cache_configured {
        return SearchStrategy {
            primary: SearchPath::Database,
            fallback: SearchPath::Database,
            reason: "no cache provider".into(),
        };
    }

    if matches!(breaker_phase, Some(Phase::Open)) {
        return SearchStrategy {
            primary: SearchPath::Database,
            fallback: SearchPath::Database,
            reason: "breaker open".into(),
        };
    }

    let Some(health) = cache_health else {
        return SearchStrategy {
            primary: SearchPath::Database,
            fallback: SearchPath::Database,
            reason: "cache unavailable".into(),
        };
    };

    if health.is_connected && health.is_search_available {
        let latency = Duration::from_millis(health.latency_ms);
        if latency < config.fast_threshold {
            return SearchStrategy {
                primary: SearchPath::Cache,
                fallback: SearchPath::Database,
                reason: "cache healthy".into(),
            };
        }
        return SearchStrategy {
            primary: SearchPath::Database,
            fallback: SearchPath::Cache,
            reason: "cache slow".into(),
        };
    }

    if health.is_connected {
        return SearchStrategy {
            primary: SearchPath::Database,
            fallback: SearchPath::Cache,
            reason: "cache connected, search unavailable".into(),
        };
    }

    SearchStrategy {
        primary: SearchPath::Database,
        fallback: SearchPath::Database,
        reason: "cache unavailable".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy(latency_ms: u64) -> HealthStatus {
        HealthStatus {
            is_connected: true,
            is_search_available: true,
            latency_ms,
            errors: vec![],
        }
    }

    #[test]
    fn no_cache_provider_always_uses_database() {
        let strategy = select_strategy(false, None, None, SelectorConfig::default());
        assert_eq!(strategy.primary, SearchPath::Database);
    }

    #[test]
    fn open_breaker_forces_database() {
        let strategy = select_strategy(
            true,
            Some(Phase::Open),
            Some(&healthy(10)),
            SelectorConfig::default(),
        );
        assert_eq!(strategy.primary, SearchPath::Database);
        assert_eq!(strategy.fallback, SearchPath::Database);
    }

    #[test]
    fn healthy_fast_cache_is_primary() {
        let strategy = select_strategy(
            true,
            Some(Phase::Closed),
            Some(&healthy(50)),
            SelectorConfig::default(),
        );
        assert_eq!(strategy.primary, SearchPath::Cache);
        assert_eq!(strategy.fallback, SearchPath::Database);
    }

    #[test]
    fn slow_cache_prefers_database_but_keeps_cache_fallback() {
        let strategy = select_strategy(
            true,
            Some(Phase::Closed),
            Some(&healthy(5000)),
            SelectorConfig::default(),
        );
        assert_eq!(strategy.primary, SearchPath::Database);
        assert_eq!(strategy.fallback, SearchPath::Cache);
    }

    #[test]
    fn connected_but_search_unavailable_prefers_database() {
        let mut health = healthy(10);
        health.is_search_available = false;
        let strategy = select_strategy(
            true,
            Some(Phase::Closed),
            Some(&health),
            SelectorConfig::default(),
        );
        assert_eq!(strategy.primary, SearchPath::Database);
        assert_eq!(strategy.fallback, SearchPath::Cache);
    }
}
