//! Upfront per-field access decisions, independent of the post-response masking pass.

use crate::classification::{Classification, RolePolicy};

/// A requested field partitioned by whether `role` may see it in the clear.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldAccessDecision {
    pub path: String,
    pub allowed: bool,
}

/// Partitions `fields` (path, classification pairs) into allowed and denied sets for `role`
/// under `policy`. Does not touch any [`search_resilience_core::types::SearchResult`]; it is
/// a pure decision helper callers can use before or instead of [`crate::masking::apply_masking`].
pub fn validate_data_access(
    policy: &RolePolicy,
    role: &str,
    fields: &[(String, Classification)],
) -> (Vec<FieldAccessDecision>, Vec<FieldAccessDecision>) {
    let mut allowed = Vec::new();
    let mut denied = Vec::new();

    for (path, classification) in fields {
        let decision = FieldAccessDecision {
            path: path.clone(),
            allowed: policy.can_see(role, *classification),
        };
        if decision.allowed {
            allowed.push(decision);
        } else {
            denied.push(decision);
        }
    }

    (allowed, denied)
}
