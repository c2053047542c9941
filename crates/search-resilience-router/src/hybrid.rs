//! Parallel cache+database fanout with merge. Neither branch is cancelled by the other's
//! completion; both are always awaited.

use std::sync::Arc;
use std::time::Instant;

use search_resilience_circuitbreaker::Circuit;
use search_resilience_core::error::{Result, SearchError};
use search_resilience_core::provider::{CacheProvider, DatabaseProvider};
use search_resilience_core::types::{SearchOptions, SearchPath, SearchPerformance};

use crate::cache_through::CacheThroughOutcome;
use crate::merge::{merge, MergeStrategy, MergeWeights};

fn elapsed_ms(started: Instant) -> u64 {
    (started.elapsed().as_millis() as u64).max(1)
}

/// Dispatches `cache.search` and `database.search` concurrently and merges or degrades
/// per the branch outcomes.
pub async fn execute(
    query: &str,
    opts: &SearchOptions,
    database: &Arc<dyn DatabaseProvider>,
    cache: &Arc<dyn CacheProvider>,
    breaker: Option<&Arc<Circuit>>,
    merge_strategy: MergeStrategy,
    merge_weights: MergeWeights,
) -> Result<CacheThroughOutcome> {
    let started = Instant::now();

    let cache_fut = async {
        match breaker {
            Some(breaker) => breaker.call(|| cache.search(query, opts)).await,
            None => cache.search(query, opts).await,
        }
    };
    let database_fut = database.search(query, opts);

    let (cache_result, database_result) = tokio::join!(cache_fut, database_fut);

    match (cache_result, database_result) {
        (Ok(cache_results), Ok(database_results)) => {
            let merged = merge(&cache_results, &database_results, merge_strategy, merge_weights);
            Ok(CacheThroughOutcome {
                performance: SearchPerformance {
                    search_time_ms: elapsed_ms(started),
                    result_count: merged.len(),
                    strategy: Some(SearchPath::Hybrid),
                    cache_hit: true,
                    errors: Vec::new(),
                },
                results: merged,
            })
        }
        (Ok(cache_results), Err(database_err)) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %database_err, "hybrid database branch failed, serving cache results");

            Ok(CacheThroughOutcome {
                performance: SearchPerformance {
                    search_time_ms: elapsed_ms(started),
                    result_count: cache_results.len(),
                    strategy: Some(SearchPath::Cache),
                    cache_hit: true,
                    errors: vec![format!("database branch failed: {database_err}")],
                },
                results: cache_results,
            })
        }
        (Err(cache_err), Ok(database_results)) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %cache_err, "hybrid cache branch failed, serving database results");

            Ok(CacheThroughOutcome {
                performance: SearchPerformance {
                    search_time_ms: elapsed_ms(started),
                    result_count: database_results.len(),
                    strategy: Some(SearchPath::Database),
                    cache_hit: false,
                    errors: vec![format!("cache branch failed: {cache_err}")],
                },
                results: database_results,
            })
        }
        (Err(cache_err), Err(database_err)) => Err(SearchError::AggregatedFailure {
            primary: "cache".into(),
            fallback: "database".into(),
            primary_message: cache_err.to_string(),
            fallback_message: database_err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use search_resilience_core::types::{HealthStatus, SearchResult};

    struct FixedProvider {
        results: Vec<SearchResult>,
        fail: bool,
    }

    #[async_trait]
    impl DatabaseProvider for FixedProvider {
        async fn connect(&self) -> Result<()> {
            Ok(())
        }
        async fn disconnect(&self) -> Result<()> {
            Ok(())
        }
        fn is_connected(&self) -> bool {
            true
        }
        async fn search(&self, _query: &str, _opts: &SearchOptions) -> Result<Vec<SearchResult>> {
            if self.fail {
                Err(SearchError::Connectivity {
                    dependency: "stub".into(),
                    message: "down".into(),
                })
            } else {
                Ok(self.results.clone())
            }
        }
        async fn check_health(&self) -> Result<HealthStatus> {
            Ok(HealthStatus::default())
        }
    }

    #[async_trait]
    impl CacheProvider for FixedProvider {
        async fn get(&self, _key: &str) -> Result<Option<Vec<SearchResult>>> {
            Ok(None)
        }
        async fn set(&self, _key: &str, _value: Vec<SearchResult>, _ttl_ms: Option<u64>) -> Result<()> {
            Ok(())
        }
        async fn delete(&self, _key: &str) -> Result<()> {
            Ok(())
        }
        async fn clear(&self, _pattern: Option<&str>) -> Result<()> {
            Ok(())
        }
    }

    fn result(id: &str, score: f64) -> SearchResult {
        SearchResult::new(id, "doc", id, score)
    }

    #[tokio::test]
    async fn both_succeed_merges_with_hybrid_strategy() {
        let cache = Arc::new(FixedProvider {
            results: vec![result("x", 80.0), result("y", 60.0)],
            fail: false,
        }) as Arc<dyn CacheProvider>;
        let database = Arc::new(FixedProvider {
            results: vec![result("y", 100.0), result("z", 50.0)],
            fail: false,
        }) as Arc<dyn DatabaseProvider>;

        let outcome = execute(
            "q",
            &SearchOptions::default(),
            &database,
            &cache,
            None,
            MergeStrategy::Weighted,
            MergeWeights::default(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.performance.strategy, Some(SearchPath::Hybrid));
        assert!(outcome.performance.cache_hit);
        let ids: Vec<&str> = outcome.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["y", "x", "z"]);
    }

    #[tokio::test]
    async fn database_branch_failure_degrades_to_cache_only() {
        let cache = Arc::new(FixedProvider {
            results: vec![result("x", 80.0)],
            fail: false,
        }) as Arc<dyn CacheProvider>;
        let database = Arc::new(FixedProvider {
            results: vec![],
            fail: true,
        }) as Arc<dyn DatabaseProvider>;

        let outcome = execute(
            "q",
            &SearchOptions::default(),
            &database,
            &cache,
            None,
            MergeStrategy::Weighted,
            MergeWeights::default(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.performance.strategy, Some(SearchPath::Cache));
        assert_eq!(outcome.performance.errors.len(), 1);
        assert_eq!(outcome.results.len(), 1);
    }

    #[tokio::test]
    async fn both_branches_failing_surfaces_aggregated_error() {
        let cache = Arc::new(FixedProvider {
            results: vec![],
            fail: true,
        }) as Arc<dyn CacheProvider>;
        let database = Arc::new(FixedProvider {
            results: vec![],
            fail: true,
        }) as Arc<dyn DatabaseProvider>;

        let result = execute(
            "q",
            &SearchOptions::default(),
            &database,
            &cache,
            None,
            MergeStrategy::Weighted,
            MergeWeights::default(),
        )
        .await;

        assert!(matches!(result, Err(SearchError::AggregatedFailure { .. })));
    }
}
