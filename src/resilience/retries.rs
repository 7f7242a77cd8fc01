//! Retry logic.
//!
//! # Responsibilities
//! - Drive the attempt loop for a single remote operation
//! - Record every failed attempt before deciding anything
//! - Apply exponential backoff with jitter between transient failures
//!
//! # Design Decisions
//! - Permanent failures propagate on first occurrence
//! - Sleeping suspends only the calling task; concurrent loops interleave freely
//! - max_retries = 0 means one attempt, no delay, immediate propagation

use std::future::Future;
use std::sync::Arc;
use std::time::SystemTime;

use crate::config::schema::RetryPolicy;
use crate::observability::metrics;
use crate::observability::reporter::{AttemptRecord, ErrorReporter};
use crate::resilience::backoff;
use crate::resilience::classify;
use crate::resilience::types::{ErrorKind, GuardError, GuardResult, RemoteError};

/// Drives bounded retries for fallible remote operations.
///
/// The policy is immutable for the executor's lifetime. Executors sharing an
/// [`ErrorReporter`] aggregate into the same history; independent reporters
/// keep histories separate.
pub struct RetryExecutor {
    policy: RetryPolicy,
    reporter: Arc<ErrorReporter>,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy, reporter: Arc<ErrorReporter>) -> Self {
        Self { policy, reporter }
    }

    /// Executor with a private reporter.
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self::new(policy, Arc::new(ErrorReporter::new()))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn reporter(&self) -> &Arc<ErrorReporter> {
        &self.reporter
    }

    /// Run `operation` up to `max_retries + 1` times.
    ///
    /// Success at any attempt returns immediately. Each failure is recorded,
    /// then either propagated (permanent, or attempts exhausted) or absorbed
    /// by a backoff sleep before the next attempt. `context` is attached to
    /// records and log entries verbatim, never interpreted.
    pub async fn execute_with_retry<T, F, Fut>(
        &self,
        mut operation: F,
        operation_name: &str,
        context: Option<serde_json::Value>,
    ) -> GuardResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let max_attempts = self.policy.max_retries.saturating_add(1);
        let mut attempt: u32 = 1;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        self.reporter.record_recovery(operation_name);
                        metrics::record_recovery(operation_name);
                        tracing::info!(
                            operation = %operation_name,
                            attempt,
                            "operation recovered after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(error) => {
                    let kind = classify::classify(&error);
                    self.reporter.record(AttemptRecord {
                        operation_name: operation_name.to_string(),
                        attempt_number: attempt,
                        timestamp: SystemTime::now(),
                        error_kind: kind,
                        error_code: error.status.clone(),
                        message: error.message.clone(),
                        context: context.clone(),
                    });
                    metrics::record_attempt_failure(operation_name, error.count_key());
                    tracing::warn!(
                        operation = %operation_name,
                        attempt,
                        max_attempts,
                        error = %error,
                        code = error.status.as_deref().unwrap_or("none"),
                        context = ?context,
                        "attempt failed"
                    );

                    if kind == ErrorKind::Permanent {
                        return Err(GuardError::Permanent {
                            operation: operation_name.to_string(),
                            attempts: attempt,
                            source: error,
                        });
                    }
                    if attempt >= max_attempts {
                        return Err(GuardError::Exhausted {
                            operation: operation_name.to_string(),
                            attempts: attempt,
                            source: error,
                        });
                    }

                    let delay = backoff::compute_delay(
                        attempt - 1,
                        self.policy.base_delay_ms,
                        self.policy.max_delay_ms,
                    );
                    tracing::debug!(
                        operation = %operation_name,
                        delay_ms = delay.as_millis() as u64,
                        "backing off before next attempt"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
