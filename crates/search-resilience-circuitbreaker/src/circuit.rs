//! The breaker state machine: CLOSED -> OPEN -> HALF_OPEN -> CLOSED.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::config::CircuitBreakerConfig;
use crate::error::BreakerError;
use crate::events::CircuitBreakerEvent;
use search_resilience_core::error::SearchError;
use search_resilience_core::events::EventListeners;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl Phase {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Phase::Open,
            2 => Phase::HalfOpen,
            _ => Phase::Closed,
        }
    }
}

/// Read-only snapshot of a breaker's state.
#[derive(Clone, Debug)]
pub struct BreakerSnapshot {
    pub phase: Phase,
    pub failure_count: u32,
    pub success_count: u32,
    pub last_failure_time: Option<Instant>,
    pub last_success_time: Option<Instant>,
    pub next_retry_time: Option<Instant>,
    pub recent_failures: usize,
    /// Share of calls in the monitoring window that ended in failure.
    pub failure_rate: f64,
}

struct Inner {
    phase: Phase,
    failure_count: u32,
    success_count: u32,
    last_failure_time: Option<Instant>,
    last_success_time: Option<Instant>,
    next_retry_time: Option<Instant>,
    recent_failures: VecDeque<Instant>,
    recent_calls: VecDeque<Instant>,
    half_open_in_flight: u32,
}

impl Inner {
    fn new() -> Self {
        Self {
            phase: Phase::Closed,
            failure_count: 0,
            success_count: 0,
            last_failure_time: None,
            last_success_time: None,
            next_retry_time: None,
            recent_failures: VecDeque::new(),
            recent_calls: VecDeque::new(),
            half_open_in_flight: 0,
        }
    }

    fn failure_rate(&self) -> f64 {
        if self.recent_calls.is_empty() {
            0.0
        } else {
            self.recent_failures.len() as f64 / self.recent_calls.len() as f64
        }
    }

    fn prune_window(&mut self, window: Duration, now: Instant) {
        while let Some(front) = self.recent_failures.front() {
            if now.duration_since(*front) > window {
                self.recent_failures.pop_front();
            } else {
                break;
            }
        }
        while let Some(front) = self.recent_calls.front() {
            if now.duration_since(*front) > window {
                self.recent_calls.pop_front();
            } else {
                break;
            }
        }
    }
}

/// A single named circuit breaker protecting one dependency.
pub struct Circuit {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
    phase_atomic: Arc<AtomicU8>,
    listeners: EventListeners<CircuitBreakerEvent>,
}

impl Circuit {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(Inner::new()),
            phase_atomic: Arc::new(AtomicU8::new(Phase::Closed as u8)),
            listeners: EventListeners::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn event_listeners_mut(&mut self) -> &mut EventListeners<CircuitBreakerEvent> {
        &mut self.listeners
    }

    /// Lock-free read of the current phase, safe to call from hot paths.
    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase_atomic.load(Ordering::Acquire))
    }

    /// A breaker is healthy when CLOSED, or HALF_OPEN with at least one probe success.
    /// HALF_OPEN with no successes yet has not proven the dependency recovered, so this
    /// locks `inner` rather than relying on the lock-free phase atomic alone.
    pub async fn is_healthy(&self) -> bool {
        let inner = self.inner.lock().await;
        match inner.phase {
            Phase::Closed => true,
            Phase::HalfOpen => inner.success_count > 0,
            Phase::Open => false,
        }
    }

    pub async fn failure_rate(&self) -> f64 {
        self.inner.lock().await.failure_rate()
    }

    pub async fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.inner.lock().await;
        BreakerSnapshot {
            phase: inner.phase,
            failure_count: inner.failure_count,
            success_count: inner.success_count,
            last_failure_time: inner.last_failure_time,
            last_success_time: inner.last_success_time,
            next_retry_time: inner.next_retry_time,
            recent_failures: inner.recent_failures.len(),
            failure_rate: inner.failure_rate(),
        }
    }

    /// Runs `op` through the breaker: rejects immediately when open, applies the configured
    /// operation timeout, and records the outcome.
    ///
    /// A timeout and an `Err` returned by `op` itself both count as a breaker failure, but
    /// only the timeout case is reported as [`SearchError::Timeout`] -- an ordinary
    /// operation error (connectivity, provider fault, ...) propagates as `op` produced it,
    /// converted via `E: Into<SearchError>`, so callers don't lose the original failure kind.
    pub async fn call<F, Fut, T, E>(&self, op: F) -> Result<T, SearchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<SearchError>,
    {
        self.try_acquire().await.map_err(SearchError::from)?;

        let started = Instant::now();
        match tokio::time::timeout(self.config.operation_timeout, op()).await {
            Ok(Ok(value)) => {
                self.record_success().await;
                Ok(value)
            }
            Ok(Err(err)) => {
                self.record_failure().await;
                Err(err.into())
            }
            Err(_) => {
                self.record_failure().await;
                Err(SearchError::from(BreakerError::Timeout {
                    name: self.name.clone(),
                    elapsed_ms: started.elapsed().as_millis() as u64,
                }))
            }
        }
    }

    /// Checks whether a call may proceed, transitioning OPEN -> HALF_OPEN when the recovery
    /// timeout has elapsed.
    pub async fn try_acquire(&self) -> Result<(), BreakerError> {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;

        if inner.phase == Phase::Open {
            match inner.next_retry_time {
                Some(retry_at) if now >= retry_at => {
                    self.transition(&mut inner, Phase::HalfOpen, now);
                }
                Some(retry_at) => {
                    self.emit(CircuitBreakerEvent::CallRejected {
                        name: self.name.clone(),
                        timestamp: now,
                    });
                    return Err(BreakerError::Open {
                        name: self.name.clone(),
                        retry_after_ms: retry_at.saturating_duration_since(now).as_millis() as u64,
                    });
                }
                None => {
                    self.emit(CircuitBreakerEvent::CallRejected {
                        name: self.name.clone(),
                        timestamp: now,
                    });
                    return Err(BreakerError::Open {
                        name: self.name.clone(),
                        retry_after_ms: 0,
                    });
                }
            }
        }

        if inner.phase == Phase::HalfOpen {
            let in_flight = inner.success_count + inner.half_open_in_flight;
            if in_flight >= self.config.max_half_open_calls {
                self.emit(CircuitBreakerEvent::CallRejected {
                    name: self.name.clone(),
                    timestamp: now,
                });
                return Err(BreakerError::Open {
                    name: self.name.clone(),
                    retry_after_ms: 0,
                });
            }
            inner.half_open_in_flight += 1;
        }

        self.emit(CircuitBreakerEvent::CallPermitted {
            name: self.name.clone(),
            timestamp: now,
        });
        Ok(())
    }

    pub async fn record_success(&self) {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;
        inner.last_success_time = Some(now);

        inner.recent_calls.push_back(now);

        match inner.phase {
            Phase::HalfOpen => {
                inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
                inner.success_count += 1;
                if inner.success_count >= self.config.success_threshold {
                    inner.failure_count = 0;
                    inner.recent_failures.clear();
                    self.transition(&mut inner, Phase::Closed, now);
                }
            }
            Phase::Closed => {
                inner.failure_count = 0;
            }
            Phase::Open => {}
        }

        drop(inner);
        self.emit(CircuitBreakerEvent::CallSucceeded {
            name: self.name.clone(),
            timestamp: now,
        });
    }

    pub async fn record_failure(&self) {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;
        inner.last_failure_time = Some(now);
        inner.recent_calls.push_back(now);
        inner.prune_window(self.config.monitoring_window, now);

        match inner.phase {
            Phase::HalfOpen => {
                inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
                inner.success_count = 0;
                self.transition(&mut inner, Phase::Open, now);
            }
            Phase::Closed => {
                inner.failure_count += 1;
                inner.recent_failures.push_back(now);
                if inner.recent_failures.len() as u32 >= self.config.failure_threshold {
                    self.transition(&mut inner, Phase::Open, now);
                }
            }
            Phase::Open => {}
        }

        drop(inner);
        self.emit(CircuitBreakerEvent::CallFailed {
            name: self.name.clone(),
            timestamp: now,
        });
    }

    pub async fn force_open(&self) {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;
        self.transition(&mut inner, Phase::Open, now);
    }

    pub async fn reset(&self) {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;
        inner.failure_count = 0;
        inner.success_count = 0;
        inner.recent_failures.clear();
        inner.half_open_in_flight = 0;
        inner.next_retry_time = None;
        self.transition(&mut inner, Phase::Closed, now);
    }

    fn transition(&self, inner: &mut Inner, to: Phase, now: Instant) {
        let from = inner.phase;
        if from == to {
            return;
        }
        inner.phase = to;
        inner.next_retry_time = match to {
            Phase::Open => Some(now + self.config.recovery_timeout),
            _ => None,
        };
        if to == Phase::HalfOpen {
            inner.success_count = 0;
            inner.half_open_in_flight = 0;
        }
        self.phase_atomic.store(to as u8, Ordering::Release);

        self.emit(CircuitBreakerEvent::StateTransition {
            name: self.name.clone(),
            from,
            to,
            timestamp: now,
        });

        #[cfg(feature = "tracing")]
        tracing::info!(breaker = %self.name, ?from, ?to, "circuit breaker state transition");

        #[cfg(feature = "metrics")]
        metrics::gauge!("search_resilience_circuit_breaker_phase", "name" => self.name.clone())
            .set(to as u8 as f64);
    }

    fn emit(&self, event: CircuitBreakerEvent) {
        self.listeners.emit(&event);
    }
}
