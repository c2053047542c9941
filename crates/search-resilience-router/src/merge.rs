//! Combines cache and database result lists under one of three merge algorithms.

use std::collections::HashMap;

use search_resilience_core::types::{MetadataValue, SearchResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeStrategy {
    Union,
    Intersection,
    Weighted,
}

/// Weights used by [`MergeStrategy::Weighted`]. Defaults mirror the reference ratio of
/// favoring the authoritative database slightly less than a hot cache hit.
#[derive(Clone, Copy, Debug)]
pub struct MergeWeights {
    pub cache_weight: f64,
    pub database_weight: f64,
}

impl Default for MergeWeights {
    fn default() -> Self {
        Self {
            cache_weight: 0.7,
            database_weight: 0.3,
        }
    }
}

/// Merges `cache` and `database` results per `strategy`, returning a list sorted by final
/// relevance score descending. Ties keep cache-before-database insertion order.
pub fn merge(
    cache: &[SearchResult],
    database: &[SearchResult],
    strategy: MergeStrategy,
    weights: MergeWeights,
) -> Vec<SearchResult> {
    match strategy {
        MergeStrategy::Union => merge_union(cache, database),
        MergeStrategy::Intersection => merge_intersection(cache, database),
        MergeStrategy::Weighted => merge_weighted(cache, database, weights),
    }
}

fn merge_union(cache: &[SearchResult], database: &[SearchResult]) -> Vec<SearchResult> {
    let mut seen = HashMap::new();
    let mut out = Vec::new();

    for result in cache.iter().chain(database.iter()) {
        if !seen.contains_key(&result.id) {
            seen.insert(result.id.clone(), out.len());
            out.push(result.clone());
        }
    }

    out.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    out
}

fn merge_intersection(cache: &[SearchResult], database: &[SearchResult]) -> Vec<SearchResult> {
    let db_by_id: HashMap<&str, &SearchResult> =
        database.iter().map(|r| (r.id.as_str(), r)).collect();

    let mut out: Vec<SearchResult> = cache
        .iter()
        .filter_map(|c| {
            db_by_id.get(c.id.as_str()).map(|d| {
                if d.relevance_score > c.relevance_score {
                    (*d).clone()
                } else {
                    c.clone()
                }
            })
        })
        .collect();

    out.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    out
}

fn merge_weighted(
    cache: &[SearchResult],
    database: &[SearchResult],
    weights: MergeWeights,
) -> Vec<SearchResult> {
    let mut order: Vec<String> = Vec::new();
    let mut by_id: HashMap<String, (Option<&SearchResult>, Option<&SearchResult>)> =
        HashMap::new();

    for result in cache {
        order.push(result.id.clone());
        by_id.entry(result.id.clone()).or_insert((None, None)).0 = Some(result);
    }
    for result in database {
        by_id
            .entry(result.id.clone())
            .or_insert_with(|| {
                order.push(result.id.clone());
                (None, None)
            })
            .1 = Some(result);
    }

    let mut out: Vec<SearchResult> = order
        .into_iter()
        .map(|id| {
            let (from_cache, from_db) = by_id.get(&id).copied().unwrap();
            let cache_score = from_cache.map(|r| r.relevance_score).unwrap_or(0.0);
            let db_score = from_db.map(|r| r.relevance_score).unwrap_or(0.0);
            let final_score =
                weights.cache_weight * cache_score + weights.database_weight * db_score;

            let mut base = from_cache.or(from_db).unwrap().clone();
            base.relevance_score = final_score;
            let source = match (from_cache, from_db) {
                (Some(_), Some(_)) => "hybrid",
                (Some(_), None) => "cache",
                (None, Some(_)) => "database",
                (None, None) => unreachable!(),
            };
            base.metadata
                .insert("source".into(), MetadataValue::Text(source.into()));
            base.metadata.insert(
                "cache_score".into(),
                MetadataValue::Number(cache_score),
            );
            base.metadata
                .insert("database_score".into(), MetadataValue::Number(db_score));
            base
        })
        .collect();

    out.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    out
}
