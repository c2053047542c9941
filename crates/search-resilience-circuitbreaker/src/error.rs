use thiserror::Error;

/// Breaker-local error, convertible into the workspace-wide [`search_resilience_core::SearchError`].
#[derive(Debug, Error, Clone)]
pub enum BreakerError {
    #[error("circuit breaker {name} is open, retry after {retry_after_ms}ms")]
    Open { name: String, retry_after_ms: u64 },

    #[error("operation on {name} timed out after {elapsed_ms}ms")]
    Timeout { name: String, elapsed_ms: u64 },
}

impl From<BreakerError> for search_resilience_core::SearchError {
    fn from(err: BreakerError) -> Self {
        match err {
            BreakerError::Open {
                name,
                retry_after_ms,
            } => search_resilience_core::SearchError::CircuitBreakerOpen {
                dependency: name,
                retry_after_ms,
            },
            BreakerError::Timeout { name, elapsed_ms } => {
                search_resilience_core::SearchError::Timeout {
                    dependency: name,
                    elapsed_ms,
                }
            }
        }
    }
}
