//! Deterministic cache-key derivation shared by the cache-through and hybrid executors.

use crate::types::SearchOptions;

const KEY_PREFIX: &str = "search:";

/// Builds a stable cache key from a query and its options.
///
/// Stability requirements: the query is lowercased and trimmed, and the filter bag is
/// serialized with sorted keys so unrelated option ordering never changes the key.
pub fn derive_cache_key(query: &str, opts: &SearchOptions) -> String {
    let normalized_query = query.trim().to_lowercase();
    let filters_repr = opts.filters.stable_repr();

    format!(
        "{KEY_PREFIX}{normalized_query}|sort={:?}:{:?}|limit={}|offset={}|{filters_repr}",
        opts.sort_by, opts.sort_order, opts.limit, opts.offset,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchFilters;

    #[test]
    fn same_query_different_case_and_whitespace_yields_same_key() {
        let opts = SearchOptions::default();
        let a = derive_cache_key("  Alpha Beta ", &opts);
        let b = derive_cache_key("alpha beta", &opts);
        assert_eq!(a, b);
    }

    #[test]
    fn different_filters_yield_different_keys() {
        let mut opts_a = SearchOptions::default();
        let mut opts_b = SearchOptions::default();
        opts_a.filters = SearchFilters {
            kind: vec!["patient".into()],
            ..Default::default()
        };
        opts_b.filters = SearchFilters {
            kind: vec!["provider".into()],
            ..Default::default()
        };

        assert_ne!(
            derive_cache_key("alpha", &opts_a),
            derive_cache_key("alpha", &opts_b)
        );
    }

    #[test]
    fn filter_list_order_does_not_affect_key() {
        let mut opts_a = SearchOptions::default();
        let mut opts_b = SearchOptions::default();
        opts_a.filters.kind = vec!["a".into(), "b".into()];
        opts_b.filters.kind = vec!["b".into(), "a".into()];

        assert_eq!(
            derive_cache_key("q", &opts_a),
            derive_cache_key("q", &opts_b)
        );
    }
}
