use std::time::Duration;

/// Configuration for a single [`crate::circuit::Circuit`].
#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub recovery_timeout: Duration,
    pub operation_timeout: Duration,
    pub monitoring_window: Duration,
    /// Calls permitted to pass through while HALF_OPEN, counting both in-flight and
    /// already-resolved probes. Caps the probe class at a fixed size instead of letting an
    /// arbitrary number of concurrent callers treat the recovery window as fully open.
    pub max_half_open_calls: u32,
}

impl CircuitBreakerConfig {
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::default()
    }

    /// Balanced defaults for a dependency with moderate traffic.
    pub fn standard() -> Self {
        CircuitBreakerConfig::builder()
            .failure_threshold(5)
            .success_threshold(3)
            .recovery_timeout(Duration::from_secs(30))
            .operation_timeout(Duration::from_secs(2))
            .monitoring_window(Duration::from_secs(60))
            .max_half_open_calls(1)
            .build()
    }

    /// Trips quickly and recovers slowly; for dependencies where a fast database fallback
    /// is cheap and a flaky cache is worse than no cache.
    pub fn fast_fail() -> Self {
        CircuitBreakerConfig::builder()
            .failure_threshold(2)
            .success_threshold(1)
            .recovery_timeout(Duration::from_secs(10))
            .operation_timeout(Duration::from_millis(500))
            .monitoring_window(Duration::from_secs(20))
            .max_half_open_calls(1)
            .build()
    }

    /// Tolerates more failures before tripping; for a cache that is expected to be noisy
    /// but is still worth preferring when it works.
    pub fn tolerant() -> Self {
        CircuitBreakerConfig::builder()
            .failure_threshold(10)
            .success_threshold(5)
            .recovery_timeout(Duration::from_secs(60))
            .operation_timeout(Duration::from_secs(5))
            .monitoring_window(Duration::from_secs(120))
            .max_half_open_calls(5)
            .build()
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        CircuitBreakerConfig::standard()
    }
}

#[derive(Debug)]
pub struct CircuitBreakerConfigBuilder {
    failure_threshold: u32,
    success_threshold: u32,
    recovery_timeout: Duration,
    operation_timeout: Duration,
    monitoring_window: Duration,
    max_half_open_calls: u32,
}

impl Default for CircuitBreakerConfigBuilder {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            recovery_timeout: Duration::from_secs(30),
            operation_timeout: Duration::from_secs(2),
            monitoring_window: Duration::from_secs(60),
            max_half_open_calls: 1,
        }
    }
}

impl CircuitBreakerConfigBuilder {
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    pub fn success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    pub fn recovery_timeout(mut self, timeout: Duration) -> Self {
        self.recovery_timeout = timeout;
        self
    }

    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    pub fn monitoring_window(mut self, window: Duration) -> Self {
        self.monitoring_window = window;
        self
    }

    pub fn max_half_open_calls(mut self, calls: u32) -> Self {
        self.max_half_open_calls = calls;
        self
    }

    pub fn build(self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            success_threshold: self.success_threshold,
            recovery_timeout: self.recovery_timeout,
            operation_timeout: self.operation_timeout,
            monitoring_window: self.monitoring_window,
            max_half_open_calls: self.max_half_open_calls,
        }
    }
}
