//! Governance-specific events, following the shared [`search_resilience_core::events`]
//! plumbing used by the circuit breaker pattern.

use std::time::Instant;

use search_resilience_core::events::ResilienceEvent;

#[derive(Debug, Clone)]
pub enum GovernanceEvent {
    AccessDenied {
        source: String,
        timestamp: Instant,
        role: String,
        reason: String,
    },
    FieldsMasked {
        source: String,
        timestamp: Instant,
        result_count: usize,
        sensitive_data_accessed: bool,
    },
}

impl ResilienceEvent for GovernanceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            GovernanceEvent::AccessDenied { .. } => "access_denied",
            GovernanceEvent::FieldsMasked { .. } => "fields_masked",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            GovernanceEvent::AccessDenied { timestamp, .. } => *timestamp,
            GovernanceEvent::FieldsMasked { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        match self {
            GovernanceEvent::AccessDenied { source, .. } => source,
            GovernanceEvent::FieldsMasked { source, .. } => source,
        }
    }
}
