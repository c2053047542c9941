//! Core types, provider contracts, error taxonomy and event plumbing for the search
//! resilience facade. Every other crate in the workspace builds on this one.

pub mod cache_key;
pub mod error;
pub mod events;
pub mod provider;
pub mod types;

pub use cache_key::derive_cache_key;
pub use error::{Result, SearchError};
pub use events::{EventListener, EventListeners, FnListener, ResilienceEvent};
pub use provider::{CacheProvider, DatabaseProvider};
pub use types::{
    DateRange, HealthStatus, MetadataValue, SearchFilters, SearchOptions, SearchPath,
    SearchPerformance, SearchResponse, SearchResult, SortBy, SortOrder,
};
