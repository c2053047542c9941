//! Exponential backoff with jitter for retryable failures on the primary path.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use search_resilience_core::error::SearchError;

#[derive(Clone, Copy, Debug)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            jitter_factor: 0.2,
        }
    }
}

impl RetryConfig {
    fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.as_millis() as f64 * 2f64.powi(attempt as i32);
        let capped = exp.min(self.max_delay.as_millis() as f64);
        let jitter = capped * self.jitter_factor * rand::rng().random::<f64>();
        Duration::from_millis((capped + jitter) as u64)
    }
}

/// Retries `op` while its error is retryable per [`SearchError::is_retryable`], up to
/// `config.max_attempts`, sleeping with exponential backoff and jitter between attempts.
pub async fn retry_with_backoff<F, Fut, T>(config: RetryConfig, mut op: F) -> Result<T, SearchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SearchError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt + 1 < config.max_attempts => {
                tokio::time::sleep(config.delay_for(attempt)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
