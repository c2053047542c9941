//! Post-response field masking: iterate configured dot-notation field paths and replace
//! values the caller's role isn't allowed to see in the clear.

use std::sync::Arc;

use search_resilience_core::types::{MetadataValue, SearchResult};

use crate::classification::Classification;
use crate::context::SecurityContext;

pub type MaskFn = Arc<dyn Fn(&MetadataValue, &str, &SecurityContext) -> MetadataValue + Send + Sync>;

/// One configured field path: its sensitivity tag (for audit's `sensitiveDataAccessed`) and
/// an optional masking function. A path with no masking function is classified but never
/// rewritten -- e.g. `icd10` in the reference scenario, which stays in the clear while still
/// counting toward `sensitiveDataAccessed`.
#[derive(Clone)]
pub struct FieldRule {
    pub path: String,
    pub classification: Classification,
    pub mask: Option<MaskFn>,
    /// If true, a caller whose role the rule's `mask` fn would redact for is denied the
    /// whole request instead of receiving a masked value. See [`crate::access`].
    pub deny_if_blocked: bool,
}

impl FieldRule {
    pub fn new(path: impl Into<String>, classification: Classification) -> Self {
        Self {
            path: path.into(),
            classification,
            mask: None,
            deny_if_blocked: false,
        }
    }

    pub fn with_mask(mut self, mask: MaskFn) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn deny_if_blocked(mut self) -> Self {
        self.deny_if_blocked = true;
        self
    }
}

/// Masks every configured path across `results` in place and reports whether any result
/// carried a value at a sensitivity-classified path (regardless of whether it was masked).
pub fn apply_masking(results: &mut [SearchResult], rules: &[FieldRule], role: &str, ctx: &SecurityContext) -> bool {
    let mut sensitive_data_accessed = false;

    for result in results.iter_mut() {
        for rule in rules {
            let Some(value) = result.metadata_path(&rule.path) else {
                continue;
            };

            if rule.classification.is_sensitive() {
                sensitive_data_accessed = true;
            }

            if let Some(mask) = &rule.mask {
                let masked = mask(value, role, ctx);
                result.set_metadata_path(&rule.path, masked);
            }
        }
    }

    sensitive_data_accessed
}

/// A common masking function: keeps the last `visible_tail` characters of a string value,
/// replacing the rest with `*`.
pub fn mask_tail(visible_tail: usize) -> MaskFn {
    Arc::new(move |value, _role, _ctx| match value {
        MetadataValue::Text(s) => {
            let chars: Vec<char> = s.chars().collect();
            if chars.len() <= visible_tail {
                return MetadataValue::Text(s.clone());
            }
            let (masked_part, visible_part) = chars.split_at(chars.len() - visible_tail);
            let masked: String = masked_part
                .iter()
                .map(|c| if c.is_ascii_alphanumeric() { '*' } else { *c })
                .chain(visible_part.iter().copied())
                .collect();
            MetadataValue::Text(masked)
        }
        other => other.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ctx() -> SecurityContext {
        SecurityContext::new("u1", "nurse", "s1", Utc::now())
    }

    fn result_with_ssn_and_icd10() -> SearchResult {
        let mut codes = std::collections::BTreeMap::new();
        codes.insert("icd10".to_string(), MetadataValue::Text("X.Y".into()));
        let mut medical = std::collections::BTreeMap::new();
        medical.insert("codes".to_string(), MetadataValue::Map(codes));

        SearchResult::new("p1", "patient", "Jane Doe", 1.0)
            .with_metadata("medical", MetadataValue::Map(medical))
            .with_metadata("ssn", MetadataValue::Text("123-45-6789".into()))
    }

    #[test]
    fn masks_ssn_but_leaves_icd10_untouched_and_flags_sensitive() {
        let mut results = vec![result_with_ssn_and_icd10()];
        let rules = vec![
            FieldRule::new("ssn", Classification::Pii).with_mask(mask_tail(4)),
            FieldRule::new("medical.codes.icd10", Classification::Phi),
        ];

        let sensitive = apply_masking(&mut results, &rules, "nurse", &ctx());

        assert!(sensitive);
        assert_eq!(
            results[0].metadata_path("ssn"),
            Some(&MetadataValue::Text("***-**-6789".into()))
        );
        assert_eq!(
            results[0].metadata_path("medical.codes.icd10"),
            Some(&MetadataValue::Text("X.Y".into()))
        );
    }

    #[test]
    fn unknown_path_is_skipped_without_panicking() {
        let mut results = vec![result_with_ssn_and_icd10()];
        let rules = vec![FieldRule::new("nonexistent.path", Classification::Restricted)];

        let sensitive = apply_masking(&mut results, &rules, "nurse", &ctx());
        assert!(!sensitive);
    }
}
