//! Circuit breaker for remote operation protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: remote assumed down, calls fail fast
//! - Half-Open: testing if the remote recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= threshold
//! Open → Half-Open: after reset timeout, admitting one trial
//! Half-Open → Closed: trial call succeeds
//! Half-Open → Open: trial call fails
//! ```
//!
//! # Design Decisions
//! - Per-operation-key breakers (not global), created through a registry
//! - Fail fast in Open state; the wrapped operation is never invoked
//! - Single trial in Half-Open; concurrent calls during a trial are rejected
//! - State lives in an explicit struct behind a mutex, inspectable via snapshot()

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tokio::time::Instant;

use crate::config::schema::CircuitBreakerConfig;
use crate::observability::metrics;
use crate::resilience::types::BreakerError;

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    fn gauge_value(self) -> u8 {
        match self {
            CircuitState::Closed => 0,
            CircuitState::Open => 1,
            CircuitState::HalfOpen => 2,
        }
    }
}

/// Observable view of a breaker, detached from its lock.
#[derive(Debug, Clone)]
pub struct CircuitSnapshot {
    pub state: CircuitState,
    pub failure_count: u32,
    pub last_failure_at: Option<Instant>,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failure_count: u32,
    last_failure_at: Option<Instant>,
    trial_in_flight: bool,
}

enum Admission {
    Pass,
    Trial,
    Reject,
}

/// Per-key circuit breaker.
///
/// Breakers for different keys are fully independent. All transitions go
/// through the guarded methods below; nothing else touches the state.
pub struct CircuitBreaker {
    key: String,
    failure_threshold: u32,
    reset_timeout: Duration,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(key: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            key: key.into(),
            failure_threshold: config.failure_threshold,
            reset_timeout: Duration::from_millis(config.reset_timeout_ms),
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure_at: None,
                trial_in_flight: false,
            }),
        }
    }

    /// The operation key this breaker guards.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Run `operation` through the breaker.
    ///
    /// In Open state (and while a half-open trial is outstanding) the call is
    /// rejected with [`BreakerError::Open`] without invoking the operation.
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let trial = match self.admit() {
            Admission::Reject => {
                metrics::record_circuit_rejection(&self.key);
                tracing::debug!(key = %self.key, "circuit open, rejecting call");
                return Err(BreakerError::Open {
                    key: self.key.clone(),
                });
            }
            Admission::Pass => false,
            Admission::Trial => true,
        };

        // The guard clears the trial slot if the future is dropped mid-call,
        // so a cancelled trial cannot wedge the breaker.
        let guard = trial.then(|| TrialGuard { breaker: self });

        let result = operation().await;
        match &result {
            Ok(_) => self.on_success(trial),
            Err(_) => self.on_failure(trial),
        }
        if let Some(guard) = guard {
            guard.disarm();
        }

        result.map_err(BreakerError::Operation)
    }

    /// Observable state for logging and dashboards.
    pub fn snapshot(&self) -> CircuitSnapshot {
        let inner = self.inner.lock().expect("breaker mutex poisoned");
        CircuitSnapshot {
            state: inner.state,
            failure_count: inner.failure_count,
            last_failure_at: inner.last_failure_at,
        }
    }

    fn admit(&self) -> Admission {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        match inner.state {
            CircuitState::Closed => Admission::Pass,
            CircuitState::Open => {
                let cooled_down = inner
                    .last_failure_at
                    .map_or(true, |at| at.elapsed() > self.reset_timeout);
                if !cooled_down {
                    return Admission::Reject;
                }
                inner.state = CircuitState::HalfOpen;
                inner.failure_count = 0;
                inner.trial_in_flight = true;
                tracing::info!(key = %self.key, "circuit half-open, admitting trial call");
                metrics::record_circuit_state(&self.key, CircuitState::HalfOpen.gauge_value());
                Admission::Trial
            }
            CircuitState::HalfOpen => {
                if inner.trial_in_flight {
                    Admission::Reject
                } else {
                    inner.trial_in_flight = true;
                    Admission::Trial
                }
            }
        }
    }

    fn on_success(&self, trial: bool) {
        if !trial {
            // Closed-state successes do not reset the failure counter; it
            // clears only on breaker creation and on a successful trial.
            return;
        }
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.trial_in_flight = false;
        tracing::info!(key = %self.key, "trial succeeded, circuit closed");
        metrics::record_circuit_state(&self.key, CircuitState::Closed.gauge_value());
    }

    fn on_failure(&self, trial: bool) {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        if trial {
            inner.state = CircuitState::Open;
            inner.failure_count = inner.failure_count.saturating_add(1);
            inner.last_failure_at = Some(Instant::now());
            inner.trial_in_flight = false;
            tracing::warn!(key = %self.key, "trial failed, circuit re-opened");
            metrics::record_circuit_state(&self.key, CircuitState::Open.gauge_value());
            return;
        }
        match inner.state {
            CircuitState::Closed => {
                inner.failure_count = inner.failure_count.saturating_add(1);
                if inner.failure_count >= self.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.last_failure_at = Some(Instant::now());
                    tracing::warn!(
                        key = %self.key,
                        failures = inner.failure_count,
                        "failure threshold reached, circuit opened"
                    );
                    metrics::record_circuit_state(&self.key, CircuitState::Open.gauge_value());
                }
            }
            // A call admitted earlier finished failing after the state moved
            // on; count it without disturbing the cooldown timer.
            CircuitState::Open | CircuitState::HalfOpen => {
                inner.failure_count = inner.failure_count.saturating_add(1);
            }
        }
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("CircuitBreaker")
            .field("key", &self.key)
            .field("state", &snapshot.state)
            .field("failure_count", &snapshot.failure_count)
            .finish()
    }
}

struct TrialGuard<'a> {
    breaker: &'a CircuitBreaker,
}

impl TrialGuard<'_> {
    fn disarm(self) {
        std::mem::forget(self);
    }
}

impl Drop for TrialGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.breaker.inner.lock().expect("breaker mutex poisoned");
        inner.trial_in_flight = false;
    }
}

/// Factory owning one breaker per operation key.
///
/// Breakers live for the registry's lifetime unless explicitly discarded.
pub struct CircuitBreakerRegistry {
    config: CircuitBreakerConfig,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl CircuitBreakerRegistry {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            breakers: DashMap::new(),
        }
    }

    /// The breaker for `key`, created on first use.
    pub fn breaker(&self, key: &str) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(key, self.config)))
            .clone()
    }

    /// Discard the breaker for `key`, if any. The next call recreates it
    /// fresh (Closed, zero failures).
    pub fn discard(&self, key: &str) {
        self.breakers.remove(key);
    }
}
