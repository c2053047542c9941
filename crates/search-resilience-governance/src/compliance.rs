//! Compliance-flag derivation for one governed search: signals a downstream compliance
//! reviewer may want surfaced, not violations the engine itself blocks on.

use chrono::Timelike;

use search_resilience_core::types::{MetadataValue, SearchResult};

use crate::context::SecurityContext;

const AFTER_HOURS_START_HOUR: u32 = 19;
const AFTER_HOURS_END_HOUR: u32 = 7;

/// Metadata path a result may carry its owning institution under, for cross-institution
/// detection. Opaque convention, same as [`crate::rls::RLS_FILTER_KEY`]: the core never
/// interprets it.
pub const INSTITUTION_METADATA_PATH: &str = "institution_id";

/// Flags raised for one governed call per the component design: after-hours access to
/// sensitive data, bulk access (more than `bulk_access_threshold` rows), and
/// cross-institution access (a result tagged with an institution other than the caller's).
pub fn derive_compliance_flags(
    ctx: &SecurityContext,
    sensitive_data_accessed: bool,
    results: &[SearchResult],
    bulk_access_threshold: usize,
) -> Vec<String> {
    let mut flags = Vec::new();

    if sensitive_data_accessed && is_after_hours(ctx) {
        flags.push("after_hours_sensitive_access".to_string());
    }

    if results.len() > bulk_access_threshold {
        flags.push("bulk_access".to_string());
    }

    if is_cross_institution(ctx, results) {
        flags.push("cross_institution_access".to_string());
    }

    flags
}

fn is_after_hours(ctx: &SecurityContext) -> bool {
    let hour = ctx.timestamp.hour();
    hour >= AFTER_HOURS_START_HOUR || hour < AFTER_HOURS_END_HOUR
}

fn is_cross_institution(ctx: &SecurityContext, results: &[SearchResult]) -> bool {
    let Some(own_institution) = ctx.institution_id.as_deref() else {
        return false;
    };

    results.iter().any(|result| {
        matches!(
            result.metadata_path(INSTITUTION_METADATA_PATH),
            Some(MetadataValue::Text(other)) if other != own_institution
        )
    })
}
