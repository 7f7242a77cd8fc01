//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the guard.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the resilience layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    /// Retry loop settings.
    pub retry: RetryPolicy,

    /// Circuit breaker settings (shared by every key in a registry).
    pub circuit_breaker: CircuitBreakerConfig,

    /// Health check settings.
    pub health: HealthCheckConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Retry policy. Immutable per executor instance.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 means exactly one attempt.
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Cap on any single backoff delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
        }
    }
}

/// Circuit breaker settings.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Failures that open the circuit.
    pub failure_threshold: u32,

    /// Cooldown before an open circuit admits a trial call, in milliseconds.
    pub reset_timeout_ms: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout_ms: 60_000,
        }
    }
}

/// Health check settings.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Passing probes required to report healthy. None means a majority of
    /// the probes that ran.
    pub min_passing: Option<u32>,

    /// Retries applied to each individual probe.
    pub probe_retries: u32,

    /// Base backoff delay between probe retries in milliseconds.
    pub probe_base_delay_ms: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            min_passing: None,
            probe_retries: 1,
            probe_base_delay_ms: 250,
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
