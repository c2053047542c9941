//! Provider contracts the core depends on. Concrete storage technologies implement these.

use crate::error::Result;
use crate::types::{HealthStatus, SearchOptions, SearchResult};
use async_trait::async_trait;

/// The slow, authoritative primary store.
///
/// Object-safe via `async-trait` so the core can hold heterogeneous implementations
/// behind `Arc<dyn DatabaseProvider>` without knowing the concrete storage technology.
#[async_trait]
pub trait DatabaseProvider: Send + Sync {
    async fn connect(&self) -> Result<()>;
    async fn disconnect(&self) -> Result<()>;
    fn is_connected(&self) -> bool;
    async fn search(&self, query: &str, opts: &SearchOptions) -> Result<Vec<SearchResult>>;
    async fn check_health(&self) -> Result<HealthStatus>;
}

/// The fast, volatile secondary store. Superset of [`DatabaseProvider`] plus keyed access.
#[async_trait]
pub trait CacheProvider: DatabaseProvider {
    async fn get(&self, key: &str) -> Result<Option<Vec<SearchResult>>>;
    async fn set(&self, key: &str, value: Vec<SearchResult>, ttl_ms: Option<u64>) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
    async fn clear(&self, pattern: Option<&str>) -> Result<()>;
}
