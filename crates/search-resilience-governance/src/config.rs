use std::sync::Arc;

use crate::audit::{AuditSink, TracingAuditSink};
use crate::classification::RolePolicy;
use crate::masking::FieldRule;
use crate::rls::{InstitutionScoped, RlsPolicy};

/// Configuration for a [`crate::engine::GovernanceLayer`]: the role policy governing field
/// visibility, the field rules masking applies, the row-level security predicate, and where
/// audit records go.
#[derive(Clone)]
pub struct GovernanceConfig {
    pub role_policy: Arc<RolePolicy>,
    pub field_rules: Arc<Vec<FieldRule>>,
    pub rls_policy: Option<Arc<dyn RlsPolicy>>,
    pub audit_sink: Arc<dyn AuditSink>,
    /// Whether the raw query text is regex-redacted (SSN/email/phone) before it is written
    /// to an audit record. On by default; a deployment whose queries never carry PII in the
    /// query string itself may turn this off to keep audit records more readable.
    pub sensitive_data_redaction: bool,
    /// Result count above which a response is flagged `bulk_access` in its audit record.
    pub bulk_access_threshold: usize,
}

impl GovernanceConfig {
    pub fn builder() -> GovernanceConfigBuilder {
        GovernanceConfigBuilder::default()
    }

    /// Role hierarchy, field rules and institution-scoped RLS tuned for a clinical search
    /// deployment: patient/researcher/nurse/doctor/admin clearance tiers, SSN masked for
    /// everyone but doctor/admin, diagnosis codes classified but left unmasked.
    pub fn healthcare_default() -> Self {
        use crate::classification::Classification;
        use crate::masking::mask_tail;

        GovernanceConfig::builder()
            .role_policy(RolePolicy::healthcare_default())
            .field_rule(FieldRule::new("ssn", Classification::Pii).with_mask(mask_tail(4)))
            .field_rule(FieldRule::new("medical.codes.icd10", Classification::Phi))
            .rls_policy(InstitutionScoped::new(["admin"]))
            .build()
    }
}

pub struct GovernanceConfigBuilder {
    role_policy: RolePolicy,
    field_rules: Vec<FieldRule>,
    rls_policy: Option<Arc<dyn RlsPolicy>>,
    audit_sink: Arc<dyn AuditSink>,
    sensitive_data_redaction: bool,
    bulk_access_threshold: usize,
}

impl Default for GovernanceConfigBuilder {
    fn default() -> Self {
        Self {
            role_policy: RolePolicy::new(),
            field_rules: Vec::new(),
            rls_policy: None,
            audit_sink: Arc::new(TracingAuditSink),
            sensitive_data_redaction: true,
            bulk_access_threshold: 1000,
        }
    }
}

impl GovernanceConfigBuilder {
    pub fn role_policy(mut self, policy: RolePolicy) -> Self {
        self.role_policy = policy;
        self
    }

    pub fn field_rule(mut self, rule: FieldRule) -> Self {
        self.field_rules.push(rule);
        self
    }

    pub fn field_rules(mut self, rules: impl IntoIterator<Item = FieldRule>) -> Self {
        self.field_rules.extend(rules);
        self
    }

    pub fn rls_policy(mut self, policy: impl RlsPolicy + 'static) -> Self {
        self.rls_policy = Some(Arc::new(policy));
        self
    }

    pub fn audit_sink(mut self, sink: impl AuditSink + 'static) -> Self {
        self.audit_sink = Arc::new(sink);
        self
    }

    /// Turns off regex redaction of the raw query text in audit records. On by default.
    pub fn sensitive_data_redaction(mut self, enabled: bool) -> Self {
        self.sensitive_data_redaction = enabled;
        self
    }

    /// Result count above which a response is flagged `bulk_access`. Defaults to 1000.
    pub fn bulk_access_threshold(mut self, threshold: usize) -> Self {
        self.bulk_access_threshold = threshold;
        self
    }

    pub fn build(self) -> GovernanceConfig {
        GovernanceConfig {
            role_policy: Arc::new(self.role_policy),
            field_rules: Arc::new(self.field_rules),
            rls_policy: self.rls_policy,
            audit_sink: self.audit_sink,
            sensitive_data_redaction: self.sensitive_data_redaction,
            bulk_access_threshold: self.bulk_access_threshold,
        }
    }
}
