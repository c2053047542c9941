//! Cache-through execution: read cache -> on miss, read database -> populate the cache.
//!
//! The breaker wraps only the cache-side calls (`get`, and `search` in the hybrid executor);
//! its own [`Circuit::call`](search_resilience_circuitbreaker::Circuit::call) already records
//! success/failure for every invocation, so this module never calls `record_failure` /
//! `record_success` directly -- doing so would double-count against the breaker's own
//! bookkeeping.

use std::sync::Arc;
use std::time::Instant;

use search_resilience_circuitbreaker::Circuit;
use search_resilience_core::cache_key::derive_cache_key;
use search_resilience_core::error::{Result, SearchError};
use search_resilience_core::provider::{CacheProvider, DatabaseProvider};
use search_resilience_core::types::{
    SearchOptions, SearchPath, SearchPerformance, SearchResult, SearchStrategy,
};

use crate::retry::{retry_with_backoff, RetryConfig};

/// TTL policy for cache writes: negative (empty) results get a shorter TTL to limit
/// staleness of a "no results" answer.
#[derive(Clone, Copy, Debug)]
pub struct TtlPolicy {
    pub default_ttl_ms: u64,
    pub empty_result_max_ttl_ms: u64,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            default_ttl_ms: 5 * 60 * 1000,
            empty_result_max_ttl_ms: 60_000,
        }
    }
}

impl TtlPolicy {
    fn ttl_for(&self, opts: &SearchOptions, result_count: usize) -> u64 {
        let base = opts.cache_ttl_ms.unwrap_or(self.default_ttl_ms);
        if result_count == 0 {
            base.min(self.empty_result_max_ttl_ms)
        } else {
            base
        }
    }
}

pub struct CacheThroughOutcome {
    pub results: Vec<SearchResult>,
    pub performance: SearchPerformance,
}

fn elapsed_ms(started: Instant) -> u64 {
    (started.elapsed().as_millis() as u64).max(1)
}

/// Runs the path chosen by `strategy.primary`, falling back to `strategy.fallback` on
/// failure. Errors from the fallback propagate as [`SearchError::AggregatedFailure`].
#[allow(clippy::too_many_arguments)]
pub async fn execute(
    query: &str,
    opts: &SearchOptions,
    strategy: &SearchStrategy,
    database: &Arc<dyn DatabaseProvider>,
    cache: Option<&Arc<dyn CacheProvider>>,
    breaker: Option<&Arc<Circuit>>,
    retry_config: RetryConfig,
    ttl_policy: TtlPolicy,
) -> Result<CacheThroughOutcome> {
    let started = Instant::now();

    match run_path(
        strategy.primary,
        query,
        opts,
        database,
        cache,
        breaker,
        retry_config,
        ttl_policy,
    )
    .await
    {
        Ok((results, path, cache_hit)) => Ok(CacheThroughOutcome {
            performance: SearchPerformance {
                search_time_ms: elapsed_ms(started),
                result_count: results.len(),
                strategy: Some(path),
                cache_hit,
                errors: Vec::new(),
            },
            results,
        }),
        Err(primary_err) => {
            if strategy.fallback == strategy.primary {
                return Err(primary_err);
            }

            #[cfg(feature = "tracing")]
            tracing::warn!(
                error = %primary_err,
                primary = %strategy.primary,
                fallback = %strategy.fallback,
                "primary search path failed, trying fallback"
            );

            match run_path(
                strategy.fallback,
                query,
                opts,
                database,
                cache,
                breaker,
                retry_config,
                ttl_policy,
            )
            .await
            {
                Ok((results, path, cache_hit)) => Ok(CacheThroughOutcome {
                    performance: SearchPerformance {
                        search_time_ms: elapsed_ms(started),
                        result_count: results.len(),
                        strategy: Some(path),
                        cache_hit,
                        errors: vec![primary_err.to_string()],
                    },
                    results,
                }),
                Err(fallback_err) => Err(SearchError::AggregatedFailure {
                    primary: strategy.primary.to_string(),
                    fallback: strategy.fallback.to_string(),
                    primary_message: primary_err.to_string(),
                    fallback_message: fallback_err.to_string(),
                }),
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_path(
    path: SearchPath,
    query: &str,
    opts: &SearchOptions,
    database: &Arc<dyn DatabaseProvider>,
    cache: Option<&Arc<dyn CacheProvider>>,
    breaker: Option<&Arc<Circuit>>,
    retry_config: RetryConfig,
    ttl_policy: TtlPolicy,
) -> Result<(Vec<SearchResult>, SearchPath, bool)> {
    match path {
        SearchPath::Cache => run_cache_path(query, opts, database, cache, breaker, retry_config, ttl_policy).await,
        SearchPath::Database => run_database_path(query, opts, database, cache, ttl_policy).await,
        SearchPath::Hybrid => {
            // The selector never emits Hybrid as a single-path primary/fallback; guard
            // against a misconfigured caller routing here instead of `hybridSearch`.
            Err(SearchError::ProviderFault {
                dependency: "router".into(),
                message: "hybrid is not a valid cache-through path".into(),
            })
        }
    }
}

async fn run_cache_path(
    query: &str,
    opts: &SearchOptions,
    database: &Arc<dyn DatabaseProvider>,
    cache: Option<&Arc<dyn CacheProvider>>,
    breaker: Option<&Arc<Circuit>>,
    retry_config: RetryConfig,
    ttl_policy: TtlPolicy,
) -> Result<(Vec<SearchResult>, SearchPath, bool)> {
    let cache = cache.ok_or_else(|| SearchError::ProviderFault {
        dependency: "cache".into(),
        message: "no cache provider configured".into(),
    })?;
    let key = derive_cache_key(query, opts);

    let get_result = match breaker {
        Some(breaker) => breaker.call(|| cache.get(&key)).await,
        None => cache.get(&key).await,
    };

    match get_result? {
        Some(results) => Ok((results, SearchPath::Cache, true)),
        None => {
            let results =
                retry_with_backoff(retry_config, || database.search(query, opts)).await?;
            let ttl = ttl_policy.ttl_for(opts, results.len());
            if let Err(_err) = cache.set(&key, results.clone(), Some(ttl)).await {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %_err, "cache populate after miss failed, ignoring");
            }
            Ok((results, SearchPath::Database, false))
        }
    }
}

async fn run_database_path(
    query: &str,
    opts: &SearchOptions,
    database: &Arc<dyn DatabaseProvider>,
    cache: Option<&Arc<dyn CacheProvider>>,
    ttl_policy: TtlPolicy,
) -> Result<(Vec<SearchResult>, SearchPath, bool)> {
    let results = database.search(query, opts).await?;

    if let Some(cache) = cache.filter(|_| opts.cache_enabled.unwrap_or(true)) {
        let key = derive_cache_key(query, opts);
        let ttl = ttl_policy.ttl_for(opts, results.len());
        let value = results.clone();
        let cache = Arc::clone(cache);
        tokio::spawn(async move {
            if let Err(_err) = cache.set(&key, value, Some(ttl)).await {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %_err, "best-effort cache populate after database read failed");
            }
        });
    }

    Ok((results, SearchPath::Database, false))
}
