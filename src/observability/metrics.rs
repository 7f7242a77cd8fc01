//! Metrics collection.
//!
//! # Metrics
//! - `guard_attempt_failures_total` (counter): failed attempts by operation, code
//! - `guard_recoveries_total` (counter): operations that succeeded after retrying
//! - `guard_circuit_rejections_total` (counter): calls rejected by an open circuit
//! - `guard_circuit_state` (gauge): 0=closed, 1=open, 2=half-open, per key
//! - `guard_health_score` (gauge): passing probes in the last health check
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the embedding application picks
//!   the exporter
//! - Updates are cheap; no allocation beyond the label strings

use metrics::{counter, gauge};

/// Record a failed attempt for an operation.
pub fn record_attempt_failure(operation: &str, code: &str) {
    counter!(
        "guard_attempt_failures_total",
        "operation" => operation.to_string(),
        "code" => code.to_string()
    )
    .increment(1);
}

/// Record an operation that succeeded after at least one failed attempt.
pub fn record_recovery(operation: &str) {
    counter!("guard_recoveries_total", "operation" => operation.to_string()).increment(1);
}

/// Record a call rejected without invoking the operation.
pub fn record_circuit_rejection(key: &str) {
    counter!("guard_circuit_rejections_total", "key" => key.to_string()).increment(1);
}

/// Record the current circuit state for a key.
pub fn record_circuit_state(key: &str, state_value: u8) {
    gauge!("guard_circuit_state", "key" => key.to_string()).set(state_value as f64);
}

/// Record the score of the latest health check.
pub fn record_health_score(score: u32) {
    gauge!("guard_health_score").set(score as f64);
}
