//! A small named-breaker registry so the router can look up "the cache breaker" etc.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::circuit::Circuit;
use crate::config::CircuitBreakerConfig;

#[derive(Default)]
pub struct CircuitBreakerRegistry {
    breakers: RwLock<HashMap<String, Arc<Circuit>>>,
}

impl CircuitBreakerRegistry {
    pub fn new() -> Self {
        Self {
            breakers: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the breaker for `name`, creating it with `config` on first use.
    pub async fn get_or_create(&self, name: &str, config: CircuitBreakerConfig) -> Arc<Circuit> {
        if let Some(existing) = self.breakers.read().await.get(name) {
            return Arc::clone(existing);
        }

        let mut breakers = self.breakers.write().await;
        breakers
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Circuit::new(name, config)))
            .clone()
    }

    pub async fn get(&self, name: &str) -> Option<Arc<Circuit>> {
        self.breakers.read().await.get(name).cloned()
    }
}
