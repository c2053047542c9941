//! Audit trail for every governed search: who asked, what they were scoped to, whether
//! sensitive data was touched, and whether the call succeeded.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::context::SecurityContext;

/// The outcome fields of one governed call, bundled so [`AuditRecord::new`] doesn't grow an
/// ever-longer positional parameter list as the audit shape gains fields.
#[derive(Clone, Debug, Default)]
pub struct AuditOutcome {
    pub search_time_ms: u64,
    pub result_count: usize,
    pub success: bool,
    pub error_message: Option<String>,
    pub sensitive_data_accessed: bool,
    pub fields_masked: Vec<String>,
    pub fields_denied: Vec<String>,
    pub rls_applied: bool,
    pub compliance_flags: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct AuditRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub user_role: String,
    pub institution_id: Option<String>,
    pub session_id: String,
    pub action: String,
    pub query: String,
    pub result_count: usize,
    pub search_time_ms: u64,
    pub success: bool,
    pub error_message: Option<String>,
    pub sensitive_data_accessed: bool,
    pub fields_masked: Vec<String>,
    pub fields_denied: Vec<String>,
    pub rls_applied: bool,
    pub compliance_flags: Vec<String>,
}

impl AuditRecord {
    pub fn new(
        ctx: &SecurityContext,
        action: impl Into<String>,
        query: &str,
        redact_query: bool,
        outcome: AuditOutcome,
    ) -> Self {
        let query = if redact_query {
            crate::redaction::redact_text(query)
        } else {
            query.to_string()
        };

        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: ctx.timestamp,
            user_id: ctx.user_id.clone(),
            user_role: ctx.user_role.clone(),
            institution_id: ctx.institution_id.clone(),
            session_id: ctx.session_id.clone(),
            action: action.into(),
            query,
            result_count: outcome.result_count,
            search_time_ms: outcome.search_time_ms,
            success: outcome.success,
            error_message: outcome.error_message,
            sensitive_data_accessed: outcome.sensitive_data_accessed,
            fields_masked: outcome.fields_masked,
            fields_denied: outcome.fields_denied,
            rls_applied: outcome.rls_applied,
            compliance_flags: outcome.compliance_flags,
        }
    }
}

/// Where audit records go. Sinks must not block or fail the search they describe; errors are
/// the sink's own problem to retry or drop.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: AuditRecord);
}

/// Default sink: emits one structured `tracing` event per record. Callers wanting durable
/// storage (a database table, a SIEM feed) provide their own [`AuditSink`].
#[derive(Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, record: AuditRecord) {
        #[cfg(feature = "tracing")]
        tracing::info!(
            audit_id = %record.id,
            user_id = %record.user_id,
            user_role = %record.user_role,
            institution_id = record.institution_id.as_deref().unwrap_or(""),
            action = %record.action,
            result_count = record.result_count,
            search_time_ms = record.search_time_ms,
            success = record.success,
            error_message = record.error_message.as_deref().unwrap_or(""),
            sensitive_data_accessed = record.sensitive_data_accessed,
            fields_masked = ?record.fields_masked,
            fields_denied = ?record.fields_denied,
            rls_applied = record.rls_applied,
            compliance_flags = ?record.compliance_flags,
            query = %record.query,
            "governed search audited"
        );

        #[cfg(not(feature = "tracing"))]
        let _ = record;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::ClearanceLevel;

    fn ctx() -> SecurityContext {
        SecurityContext::new("u1", "nurse", "s1", Utc::now()).with_clearance(ClearanceLevel::Internal)
    }

    #[tokio::test]
    async fn tracing_sink_accepts_record_without_panicking() {
        let record = AuditRecord::new(
            &ctx(),
            "search",
            "ssn 123-45-6789",
            true,
            AuditOutcome {
                result_count: 3,
                sensitive_data_accessed: true,
                fields_masked: vec!["ssn".into()],
                rls_applied: true,
                success: true,
                ..Default::default()
            },
        );
        assert!(record.query.contains("[REDACTED:ssn]"));

        let sink = TracingAuditSink;
        sink.record(record).await;
    }

    #[test]
    fn redaction_can_be_turned_off() {
        let record = AuditRecord::new(
            &ctx(),
            "search",
            "ssn 123-45-6789",
            false,
            AuditOutcome::default(),
        );
        assert_eq!(record.query, "ssn 123-45-6789");
    }

    #[test]
    fn carries_failure_details_when_unsuccessful() {
        let record = AuditRecord::new(
            &ctx(),
            "search",
            "q",
            false,
            AuditOutcome {
                success: false,
                error_message: Some("database unreachable".into()),
                ..Default::default()
            },
        );
        assert!(!record.success);
        assert_eq!(record.error_message.as_deref(), Some("database unreachable"));
    }
}
