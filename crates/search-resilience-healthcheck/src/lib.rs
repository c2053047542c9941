//! Request-path memoization of dependency health.

pub mod cache;

pub use cache::HealthCache;
