//! Request and response shapes shared by every execution path.

use std::collections::BTreeMap;
use std::fmt;

/// A single search hit. Identity for deduplication and merging is [`SearchResult::id`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResult {
    pub id: String,
    pub kind: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub match_type: Option<String>,
    pub relevance_score: f64,
    pub metadata: BTreeMap<String, MetadataValue>,
}

impl SearchResult {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, title: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            title: title.into(),
            subtitle: None,
            description: None,
            category: None,
            language: None,
            match_type: None,
            relevance_score: score,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Reads a dot-separated path into `metadata` (e.g. `"medical.codes.icd10"`).
    /// Returns `None` if any segment is missing or not a [`MetadataValue::Map`].
    pub fn metadata_path(&self, path: &str) -> Option<&MetadataValue> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.metadata.get(first)?;
        for segment in segments {
            match current {
                MetadataValue::Map(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Overwrites the value at a dot-separated path, leaving the path untouched if any
    /// intermediate segment is absent or not a map (unknown paths are skipped, per the
    /// masking contract).
    pub fn set_metadata_path(&mut self, path: &str, value: MetadataValue) -> bool {
        let mut segments: Vec<&str> = path.split('.').collect();
        let last = match segments.pop() {
            Some(last) => last,
            None => return false,
        };

        let mut current = &mut self.metadata;
        for segment in &segments {
            match current.get_mut(*segment) {
                Some(MetadataValue::Map(map)) => current = map,
                _ => return false,
            }
        }

        if current.contains_key(last) {
            current.insert(last.to_string(), value);
            true
        } else {
            false
        }
    }
}

/// A dynamically-typed metadata value. Values only, never back-references into results.
///
/// `Map` lets source-specific fields nest (e.g. `medical.codes.icd10`) so the governance
/// layer's dot-path field masking has somewhere to walk.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MetadataValue {
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<MetadataValue>),
    Map(BTreeMap<String, MetadataValue>),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(s) => write!(f, "{s}"),
            MetadataValue::Number(n) => write!(f, "{n}"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            MetadataValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortBy {
    #[default]
    Relevance,
    Date,
    Name,
    Custom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Inclusive date range filter, expressed as caller-opaque strings (e.g. RFC3339).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Typed filter bag plus a free-form escape hatch for provider-specific predicates.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchFilters {
    pub kind: Vec<String>,
    pub category: Vec<String>,
    pub language: Vec<String>,
    pub visibility: Vec<String>,
    pub date_range: Option<DateRange>,
    pub custom: BTreeMap<String, String>,
}

impl SearchFilters {
    /// A stable, order-independent serialization suitable for cache key derivation.
    pub fn stable_repr(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("kind={}", sorted_joined(&self.kind)));
        parts.push(format!("category={}", sorted_joined(&self.category)));
        parts.push(format!("language={}", sorted_joined(&self.language)));
        parts.push(format!("visibility={}", sorted_joined(&self.visibility)));
        if let Some(range) = &self.date_range {
            parts.push(format!(
                "date={}..{}",
                range.start.as_deref().unwrap_or(""),
                range.end.as_deref().unwrap_or("")
            ));
        }
        for (k, v) in &self.custom {
            parts.push(format!("custom.{k}={v}"));
        }
        parts.join("&")
    }
}

fn sorted_joined(values: &[String]) -> String {
    let mut sorted = values.to_vec();
    sorted.sort();
    sorted.join(",")
}

/// Options controlling a single `search` invocation.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchOptions {
    pub limit: usize,
    pub offset: usize,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub filters: SearchFilters,
    pub cache_enabled: Option<bool>,
    pub cache_ttl_ms: Option<u64>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            filters: SearchFilters::default(),
            cache_enabled: None,
            cache_ttl_ms: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchPath {
    Cache,
    Database,
    Hybrid,
}

impl fmt::Display for SearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchPath::Cache => write!(f, "cache"),
            SearchPath::Database => write!(f, "database"),
            SearchPath::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// The outcome of strategy selection: which path runs first, and where to land on failure.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStrategy {
    pub primary: SearchPath,
    pub fallback: SearchPath,
    pub reason: String,
}

/// Per-response telemetry surfaced alongside results.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchPerformance {
    pub search_time_ms: u64,
    pub result_count: usize,
    pub strategy: Option<SearchPath>,
    pub cache_hit: bool,
    pub errors: Vec<String>,
}

/// The full response of a `search` / `hybrid_search` call.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub performance: SearchPerformance,
    pub strategy: Option<SearchStrategy>,
}

/// Self-reported health of a dependency.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthStatus {
    pub is_connected: bool,
    pub is_search_available: bool,
    pub latency_ms: u64,
    pub errors: Vec<String>,
}

impl HealthStatus {
    pub fn unhealthy(reason: impl Into<String>) -> Self {
        Self {
            is_connected: false,
            is_search_available: false,
            latency_ms: 0,
            errors: vec![reason.into()],
        }
    }
}
