//! [`GovernanceLayer::secure_search`]: the caller-scoped wrapper around a plain search call.
//!
//! The layer takes the search itself as a closure rather than depending on the router crate
//! directly, so the composition root (the facade crate) is the only place that wires
//! governance and routing together.

use std::future::Future;
use std::time::Instant;

use search_resilience_core::error::{Result, SearchError};
use search_resilience_core::events::EventListeners;
use search_resilience_core::types::{SearchOptions, SearchResponse};

use crate::access::validate_data_access;
use crate::audit::{AuditOutcome, AuditRecord};
use crate::compliance::derive_compliance_flags;
use crate::config::GovernanceConfig;
use crate::context::SecurityContext;
use crate::events::GovernanceEvent;
use crate::masking::apply_masking;
use crate::rls::apply_rls;

const SOURCE: &str = "governance";
const ACTION: &str = "search";

fn elapsed_ms(started: Instant) -> u64 {
    (started.elapsed().as_millis() as u64).max(1)
}

/// The result of [`GovernanceLayer::secure_search`]: the underlying search response plus the
/// id of the audit record written for this call.
#[derive(Clone, Debug)]
pub struct SecureSearchResponse {
    pub response: SearchResponse,
    pub audit_id: String,
}

/// Wraps a search call with row-level security predicate injection, upfront access denial,
/// post-response field masking, and audit logging.
pub struct GovernanceLayer {
    config: GovernanceConfig,
    events: EventListeners<GovernanceEvent>,
}

impl GovernanceLayer {
    pub fn new(config: GovernanceConfig) -> Self {
        Self {
            config,
            events: EventListeners::new(),
        }
    }

    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: search_resilience_core::events::EventListener<GovernanceEvent> + 'static,
    {
        self.events.add(listener);
    }

    /// Runs `executor` (the actual search) under this layer's policy. `executor` receives the
    /// query and the RLS-augmented options and returns a [`SearchResponse`]; its results are
    /// masked in place before the response is handed back to the caller.
    pub async fn secure_search<F, Fut>(
        &self,
        ctx: &SecurityContext,
        query: &str,
        mut opts: SearchOptions,
        executor: F,
    ) -> Result<SecureSearchResponse>
    where
        F: FnOnce(String, SearchOptions) -> Fut,
        Fut: Future<Output = Result<SearchResponse>>,
    {
        let started = Instant::now();
        let classified_fields: Vec<_> = self
            .config
            .field_rules
            .iter()
            .map(|rule| (rule.path.clone(), rule.classification))
            .collect();

        let (_allowed, denied) = validate_data_access(&self.config.role_policy, &ctx.user_role, &classified_fields);
        let fields_denied: Vec<String> = denied.into_iter().map(|decision| decision.path).collect();

        let fields_masked: Vec<String> = self
            .config
            .field_rules
            .iter()
            .filter(|rule| rule.mask.is_some())
            .map(|rule| rule.path.clone())
            .collect();

        let hard_denied: Vec<&str> = fields_denied
            .iter()
            .filter(|path| {
                self.config
                    .field_rules
                    .iter()
                    .any(|rule| &rule.path == *path && rule.deny_if_blocked)
            })
            .map(String::as_str)
            .collect();

        if !hard_denied.is_empty() {
            let reason = format!("role lacks clearance for: {}", hard_denied.join(", "));
            self.events.emit(&GovernanceEvent::AccessDenied {
                source: SOURCE.to_string(),
                timestamp: Instant::now(),
                role: ctx.user_role.clone(),
                reason: reason.clone(),
            });
            let record = AuditRecord::new(
                ctx,
                ACTION,
                query,
                self.config.sensitive_data_redaction,
                AuditOutcome {
                    search_time_ms: elapsed_ms(started),
                    success: false,
                    error_message: Some(reason.clone()),
                    fields_masked,
                    fields_denied,
                    ..Default::default()
                },
            );
            self.config.audit_sink.record(record).await;
            return Err(SearchError::SecurityAccessDenied(reason));
        }

        let rls_applied = match &self.config.rls_policy {
            Some(policy) => apply_rls(
                &mut opts,
                policy.as_ref(),
                &ctx.user_id,
                &ctx.user_role,
                ctx.institution_id.as_deref(),
            ),
            None => false,
        };

        let executed = executor(query.to_string(), opts).await;

        let mut response = match executed {
            Ok(response) => response,
            Err(err) => {
                let record = AuditRecord::new(
                    ctx,
                    ACTION,
                    query,
                    self.config.sensitive_data_redaction,
                    AuditOutcome {
                        search_time_ms: elapsed_ms(started),
                        success: false,
                        error_message: Some(err.to_string()),
                        fields_masked,
                        fields_denied,
                        rls_applied,
                        ..Default::default()
                    },
                );
                self.config.audit_sink.record(record).await;
                return Err(err);
            }
        };

        let sensitive_data_accessed = apply_masking(&mut response.results, &self.config.field_rules, &ctx.user_role, ctx);

        self.events.emit(&GovernanceEvent::FieldsMasked {
            source: SOURCE.to_string(),
            timestamp: Instant::now(),
            result_count: response.results.len(),
            sensitive_data_accessed,
        });

        let compliance_flags =
            derive_compliance_flags(ctx, sensitive_data_accessed, &response.results, self.config.bulk_access_threshold);

        let record = AuditRecord::new(
            ctx,
            ACTION,
            query,
            self.config.sensitive_data_redaction,
            AuditOutcome {
                search_time_ms: elapsed_ms(started),
                result_count: response.results.len(),
                success: true,
                sensitive_data_accessed,
                fields_masked,
                fields_denied,
                rls_applied,
                compliance_flags,
                ..Default::default()
            },
        );
        let audit_id = record.id.clone();
        self.config.audit_sink.record(record).await;

        Ok(SecureSearchResponse { response, audit_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::{Classification, ClearanceLevel, RolePolicy};
    use crate::masking::{mask_tail, FieldRule};
    use crate::rls::InstitutionScoped;
    use chrono::Utc;
    use search_resilience_core::types::{MetadataValue, SearchPerformance, SearchResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSink {
        count: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl crate::audit::AuditSink for CountingSink {
        async fn record(&self, _record: AuditRecord) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn ctx(role: &str) -> SecurityContext {
        SecurityContext::new("u1", role, "s1", Utc::now())
            .with_institution("hosp-1")
            .with_clearance(ClearanceLevel::Internal)
    }

    fn stub_response() -> Result<SearchResponse> {
        Ok(SearchResponse {
            results: vec![
                SearchResult::new("p1", "patient", "Jane Doe", 1.0).with_metadata("ssn", MetadataValue::Text("123-45-6789".into())),
            ],
            performance: SearchPerformance::default(),
            strategy: None,
        })
    }

    #[tokio::test]
    async fn masks_ssn_and_records_audit_for_nurse() {
        let sink_count = Arc::new(AtomicUsize::new(0));
        let config = GovernanceConfig::builder()
            .role_policy(RolePolicy::healthcare_default())
            .field_rule(FieldRule::new("ssn", Classification::Pii).with_mask(mask_tail(4)))
            .rls_policy(InstitutionScoped::new(["admin"]))
            .audit_sink(CountingSink {
                count: Arc::clone(&sink_count),
            })
            .build();
        let layer = GovernanceLayer::new(config);

        let response = layer
            .secure_search(&ctx("nurse"), "find patients", SearchOptions::default(), |_query, opts| async move {
                assert!(opts.filters.custom.contains_key(crate::rls::RLS_FILTER_KEY));
                stub_response()
            })
            .await
            .unwrap();

        assert_eq!(
            response.response.results[0].metadata_path("ssn"),
            Some(&MetadataValue::Text("***-**-6789".into()))
        );
        assert!(!response.audit_id.is_empty());
        assert_eq!(sink_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn denies_whole_request_when_hard_denied_field_configured() {
        let config = GovernanceConfig::builder()
            .role_policy(RolePolicy::healthcare_default())
            .field_rule(FieldRule::new("medical.codes.icd10", Classification::Phi).deny_if_blocked())
            .build();
        let layer = GovernanceLayer::new(config);

        let result = layer
            .secure_search(&ctx("patient"), "find patients", SearchOptions::default(), |_q, _o| async { stub_response() })
            .await;

        assert!(matches!(result, Err(SearchError::SecurityAccessDenied(_))));
    }

    #[tokio::test]
    async fn audits_exactly_once_on_denial_and_on_executor_failure() {
        let sink_count = Arc::new(AtomicUsize::new(0));
        let config = GovernanceConfig::builder()
            .role_policy(RolePolicy::healthcare_default())
            .field_rule(FieldRule::new("medical.codes.icd10", Classification::Phi).deny_if_blocked())
            .audit_sink(CountingSink {
                count: Arc::clone(&sink_count),
            })
            .build();
        let layer = GovernanceLayer::new(config);

        let denied = layer
            .secure_search(&ctx("patient"), "q", SearchOptions::default(), |_q, _o| async { stub_response() })
            .await;
        assert!(denied.is_err());
        assert_eq!(sink_count.load(Ordering::SeqCst), 1);

        let config = GovernanceConfig::builder()
            .role_policy(RolePolicy::healthcare_default())
            .audit_sink(CountingSink {
                count: Arc::clone(&sink_count),
            })
            .build();
        let layer = GovernanceLayer::new(config);

        let failed = layer
            .secure_search(&ctx("nurse"), "q", SearchOptions::default(), |_q, _o| async {
                Err(SearchError::ProviderFault {
                    dependency: "database".into(),
                    message: "boom".into(),
                })
            })
            .await;
        assert!(failed.is_err());
        assert_eq!(sink_count.load(Ordering::SeqCst), 2);
    }
}
