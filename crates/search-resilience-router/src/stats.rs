//! The `getSearchStats` response shape: a snapshot of everything the selector considers.

use search_resilience_circuitbreaker::BreakerSnapshot;
use search_resilience_core::types::{HealthStatus, SearchStrategy};

#[derive(Clone, Debug)]
pub struct SearchStats {
    pub cache_health: Option<HealthStatus>,
    pub database_health: Option<HealthStatus>,
    pub circuit_breaker: Option<BreakerSnapshot>,
    pub recommended_strategy: SearchStrategy,
}
