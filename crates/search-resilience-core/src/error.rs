//! Shared error taxonomy. Every crate in the workspace converges on [`SearchError`].

use std::time::Duration;
use thiserror::Error;

/// Classified failure kinds, each carrying its own retry semantics.
#[derive(Debug, Error, Clone)]
pub enum SearchError {
    #[error("connectivity error talking to {dependency}: {message}")]
    Connectivity { dependency: String, message: String },

    #[error("operation on {dependency} timed out after {elapsed_ms}ms")]
    Timeout { dependency: String, elapsed_ms: u64 },

    #[error("circuit breaker for {dependency} is open, retry after {retry_after_ms}ms")]
    CircuitBreakerOpen {
        dependency: String,
        retry_after_ms: u64,
    },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("provider fault in {dependency}: {message}")]
    ProviderFault { dependency: String, message: String },

    #[error("access denied: {0}")]
    SecurityAccessDenied(String),

    #[error("compliance violation: {0}")]
    ComplianceViolation(String),

    #[error("rate limit exceeded, retry after {retry_after_ms}ms")]
    RateLimitExceeded { retry_after_ms: u64 },

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("both {primary} and {fallback} failed: {primary_message} / {fallback_message}")]
    AggregatedFailure {
        primary: String,
        fallback: String,
        primary_message: String,
        fallback_message: String,
    },
}

impl SearchError {
    /// Whether an executor may retry the operation that produced this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SearchError::Connectivity { .. }
                | SearchError::Timeout { .. }
                | SearchError::RateLimitExceeded { .. }
                | SearchError::ResourceExhausted(_)
        )
    }

    /// Suggested delay before the next retry attempt, when known.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SearchError::CircuitBreakerOpen { retry_after_ms, .. }
            | SearchError::RateLimitExceeded { retry_after_ms } => {
                Some(Duration::from_millis(*retry_after_ms))
            }
            _ => None,
        }
    }

    pub fn dependency(&self) -> Option<&str> {
        match self {
            SearchError::Connectivity { dependency, .. }
            | SearchError::Timeout { dependency, .. }
            | SearchError::CircuitBreakerOpen { dependency, .. }
            | SearchError::ProviderFault { dependency, .. } => Some(dependency),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
