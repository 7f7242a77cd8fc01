//! Health check battery.
//!
//! # Responsibilities
//! - Run a caller-supplied battery of named connectivity/capability probes
//! - Aggregate results into a score and an overall verdict
//!
//! # Design Decisions
//! - A probe failure degrades the score; it never aborts the battery
//! - Probes run through a small retry loop so one network blip does not
//!   mark the service unhealthy
//! - perform_health_check never fails; the result carries the error text

use std::collections::HashMap;
use std::future::Future;

use futures_util::future::BoxFuture;
use serde::Serialize;

use crate::config::schema::{HealthCheckConfig, RetryPolicy};
use crate::observability::metrics;
use crate::resilience::retries::RetryExecutor;
use crate::resilience::types::RemoteError;

/// A named boolean probe, e.g. "network reachable" or "can query balance".
pub struct HealthProbe {
    name: String,
    run: Box<dyn Fn() -> BoxFuture<'static, Result<bool, RemoteError>> + Send + Sync>,
}

impl HealthProbe {
    pub fn new<F, Fut>(name: impl Into<String>, probe: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, RemoteError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            run: Box::new(move || Box::pin(probe())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Outcome of one battery run. Produced fresh on each invocation.
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResult {
    /// Per-probe verdicts.
    pub checks: HashMap<String, bool>,
    /// Number of passing probes.
    pub score: u32,
    pub healthy: bool,
    /// Probe errors, when any probe failed outright.
    pub error: Option<String>,
}

/// Runs probe batteries and aggregates a health verdict.
pub struct HealthChecker {
    executor: RetryExecutor,
    min_passing: Option<u32>,
}

impl HealthChecker {
    pub fn new(config: HealthCheckConfig) -> Self {
        let policy = RetryPolicy {
            max_retries: config.probe_retries,
            base_delay_ms: config.probe_base_delay_ms,
            ..RetryPolicy::default()
        };
        Self {
            executor: RetryExecutor::with_policy(policy),
            min_passing: config.min_passing,
        }
    }

    /// Run every probe and aggregate. Never raises: probe failures count as
    /// a failing check and are reported in the result's error field.
    pub async fn perform_health_check(&self, probes: &[HealthProbe]) -> HealthCheckResult {
        let mut checks = HashMap::new();
        let mut failures = Vec::new();

        for probe in probes {
            let operation_name = format!("health:{}", probe.name);
            let outcome = self
                .executor
                .execute_with_retry(|| (probe.run)(), &operation_name, None)
                .await;

            let passed = match outcome {
                Ok(passed) => passed,
                Err(err) => {
                    failures.push(format!("{}: {}", probe.name, err));
                    false
                }
            };
            if !passed {
                tracing::warn!(probe = %probe.name, "health probe failed");
            }
            checks.insert(probe.name.clone(), passed);
        }

        let score = checks.values().filter(|passed| **passed).count() as u32;
        let required = self
            .min_passing
            .unwrap_or_else(|| (probes.len() as u32).div_ceil(2));
        let healthy = score >= required;

        metrics::record_health_score(score);
        tracing::info!(
            score,
            total = probes.len(),
            healthy,
            "health check complete"
        );

        HealthCheckResult {
            checks,
            score,
            healthy,
            error: if failures.is_empty() {
                None
            } else {
                Some(failures.join("; "))
            },
        }
    }
}
