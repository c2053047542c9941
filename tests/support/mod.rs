//! Shared in-memory provider doubles for the integration suite. These stand in for the
//! concrete relational/document/key-value providers that sit outside this workspace's scope.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use search_resilience_core::error::{Result, SearchError};
use search_resilience_core::provider::{CacheProvider, DatabaseProvider};
use search_resilience_core::types::{HealthStatus, SearchOptions, SearchResult};

pub fn result(id: &str, kind: &str, score: f64) -> SearchResult {
    SearchResult::new(id, kind, id, score)
}

/// A database double that always succeeds with a fixed result set and reports how many
/// times `search` was invoked.
pub struct FixtureDatabase {
    pub results: Vec<SearchResult>,
    pub health: HealthStatus,
    pub search_calls: AtomicU32,
}

impl FixtureDatabase {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            health: HealthStatus {
                is_connected: true,
                is_search_available: true,
                latency_ms: 2,
                errors: vec![],
            },
            search_calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseProvider for FixtureDatabase {
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
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.results.clone())
    }
    async fn check_health(&self) -> Result<HealthStatus> {
        Ok(self.health.clone())
    }
}

/// An in-memory key-value cache double, healthy by default, whose `get`/`set` can be made to
/// fail on demand to exercise breaker and fallback behavior.
pub struct FixtureCache {
    store: Mutex<HashMap<String, Vec<SearchResult>>>,
    pub health: Mutex<HealthStatus>,
    pub fail_get: std::sync::atomic::AtomicBool,
    pub set_calls: AtomicU32,
    pub get_calls: AtomicU32,
}

impl FixtureCache {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            health: Mutex::new(HealthStatus {
                is_connected: true,
                is_search_available: true,
                latency_ms: 5,
                errors: vec![],
            }),
            fail_get: std::sync::atomic::AtomicBool::new(false),
            set_calls: AtomicU32::new(0),
            get_calls: AtomicU32::new(0),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_get.store(failing, Ordering::SeqCst);
    }

    pub fn seed(&self, key: &str, results: Vec<SearchResult>) {
        self.store.lock().unwrap().insert(key.to_string(), results);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.store.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl DatabaseProvider for FixtureCache {
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
        Ok(vec![])
    }
    async fn check_health(&self) -> Result<HealthStatus> {
        Ok(self.health.lock().unwrap().clone())
    }
}

#[async_trait]
impl CacheProvider for FixtureCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<SearchResult>>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(SearchError::Connectivity {
                dependency: "cache".into(),
                message: "simulated outage".into(),
            });
        }
        Ok(self.store.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<SearchResult>, _ttl_ms: Option<u64>) -> Result<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.store.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.store.lock().unwrap().remove(key);
        Ok(())
    }

    async fn clear(&self, _pattern: Option<&str>) -> Result<()> {
        self.store.lock().unwrap().clear();
        Ok(())
    }
}
