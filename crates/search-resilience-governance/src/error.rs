use thiserror::Error;

/// Governance-local error, convertible into the workspace-wide
/// [`search_resilience_core::SearchError`].
#[derive(Debug, Error, Clone)]
pub enum GovernanceError {
    #[error("access denied for role {role}: {reason}")]
    AccessDenied { role: String, reason: String },

    #[error("audit sink failed: {0}")]
    AuditSinkFailed(String),
}

impl From<GovernanceError> for search_resilience_core::SearchError {
    fn from(err: GovernanceError) -> Self {
        match err {
            GovernanceError::AccessDenied { role, reason } => {
                search_resilience_core::SearchError::SecurityAccessDenied(format!("{role}: {reason}"))
            }
            GovernanceError::AuditSinkFailed(message) => {
                search_resilience_core::SearchError::ComplianceViolation(message)
            }
        }
    }
}
