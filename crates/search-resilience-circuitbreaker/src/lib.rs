//! Circuit breaker protecting the cache dependency, one instance per named dependency.

pub mod circuit;
pub mod config;
pub mod error;
pub mod events;
pub mod registry;

pub use circuit::{BreakerSnapshot, Circuit, Phase};
pub use config::{CircuitBreakerConfig, CircuitBreakerConfigBuilder};
pub use error::BreakerError;
pub use events::CircuitBreakerEvent;
pub use registry::CircuitBreakerRegistry;
