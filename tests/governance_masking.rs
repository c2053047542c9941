//! Concrete scenario 6: role-based field masking and audit recording through the full
//! facade (`secure_search` wrapping `search`).

#[path = "support/mod.rs"]
mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use search_resilience::{SearchResilience, RouterConfig};
use search_resilience_core::provider::DatabaseProvider;
use search_resilience_core::types::{MetadataValue, SearchOptions};
use search_resilience_governance::{
    mask_tail, AuditRecord, AuditSink, Classification, FieldRule, GovernanceConfig, RolePolicy,
    SecurityContext,
};

use support::FixtureDatabase;

fn patient_with_sensitive_fields() -> search_resilience_core::types::SearchResult {
    let mut codes = std::collections::BTreeMap::new();
    codes.insert("icd10".to_string(), MetadataValue::Text("E11.9".into()));
    let mut medical = std::collections::BTreeMap::new();
    medical.insert("codes".to_string(), MetadataValue::Map(codes));

    search_resilience_core::types::SearchResult::new("p1", "patient", "Jane Doe", 1.0)
        .with_metadata("medical", MetadataValue::Map(medical))
        .with_metadata("ssn", MetadataValue::Text("123-45-6789".into()))
}

struct CountingSink {
    count: Arc<AtomicUsize>,
    last: Arc<std::sync::Mutex<Option<AuditRecord>>>,
}

#[async_trait]
impl AuditSink for CountingSink {
    async fn record(&self, record: AuditRecord) {
        self.count.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(record);
    }
}

#[tokio::test]
async fn nurse_sees_masked_ssn_but_unmasked_icd10_and_one_audit_record_is_written() {
    let database = Arc::new(FixtureDatabase::new(vec![patient_with_sensitive_fields()]));
    let sink_count = Arc::new(AtomicUsize::new(0));
    let sink_last = Arc::new(std::sync::Mutex::new(None));
    let sink = CountingSink {
        count: Arc::clone(&sink_count),
        last: Arc::clone(&sink_last),
    };

    let governance = GovernanceConfig::builder()
        .role_policy(RolePolicy::healthcare_default())
        .field_rule(FieldRule::new("ssn", Classification::Pii).with_mask(mask_tail(4)))
        .field_rule(FieldRule::new("medical.codes.icd10", Classification::Phi))
        .audit_sink(sink)
        .build();

    let facade = SearchResilience::builder(database as Arc<dyn DatabaseProvider>)
        .router_config(RouterConfig::default())
        .governance(governance)
        .build();

    let ctx = SecurityContext::new("u1", "nurse", "s1", Utc::now());
    let secured = facade
        .secure_search(&ctx, "find patients", SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(
        secured.response.results[0].metadata_path("ssn"),
        Some(&MetadataValue::Text("***-**-6789".into()))
    );
    assert_eq!(
        secured.response.results[0].metadata_path("medical.codes.icd10"),
        Some(&MetadataValue::Text("E11.9".into()))
    );
    assert!(!secured.audit_id.is_empty());
    assert_eq!(sink_count.load(Ordering::SeqCst), 1);

    let last = sink_last.lock().unwrap().clone();
    let record = last.expect("audit record recorded");
    assert_eq!(record.action, "search");
    assert!(record.success);
    assert!(record.search_time_ms >= 1);
    assert!(record.sensitive_data_accessed);
}

#[tokio::test]
async fn doctor_is_not_subject_to_the_deny_if_blocked_restriction_a_patient_hits() {
    let database = Arc::new(FixtureDatabase::new(vec![patient_with_sensitive_fields()]));

    let governance = GovernanceConfig::builder()
        .role_policy(RolePolicy::healthcare_default())
        .field_rule(FieldRule::new("medical.codes.icd10", Classification::Phi).deny_if_blocked())
        .build();

    let facade = SearchResilience::builder(database as Arc<dyn DatabaseProvider>)
        .governance(governance)
        .build();

    let patient_ctx = SecurityContext::new("u2", "patient", "s2", Utc::now());
    let denied = facade
        .secure_search(&patient_ctx, "find patients", SearchOptions::default())
        .await;
    assert!(denied.is_err());

    let doctor_ctx = SecurityContext::new("u3", "doctor", "s3", Utc::now());
    let allowed = facade
        .secure_search(&doctor_ctx, "find patients", SearchOptions::default())
        .await;
    assert!(allowed.is_ok());
}
