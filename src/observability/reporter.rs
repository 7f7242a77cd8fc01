//! Failure history and aggregation.
//!
//! # Responsibilities
//! - Record one immutable record per failed attempt
//! - Count failures keyed by status code (or message when no code exists)
//! - Track which operations eventually recovered after failing
//!
//! # Design Decisions
//! - Explicit instance, shared via Arc; no process-wide singleton
//! - Append-only history, cleared only by an explicit reset()
//! - Mutex over the whole inner state; records are small and writes are rare

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::resilience::types::ErrorKind;

/// One failed attempt. Created by the retry executor, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub operation_name: String,
    /// 1-based attempt index within its retry loop.
    pub attempt_number: u32,
    pub timestamp: SystemTime,
    pub error_kind: ErrorKind,
    pub error_code: Option<String>,
    pub message: String,
    /// Caller-supplied context, logged verbatim, never interpreted.
    pub context: Option<serde_json::Value>,
}

/// Aggregated view of everything recorded so far.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub total_errors: u64,
    pub error_counts: HashMap<String, u64>,
    pub history: Vec<AttemptRecord>,
    /// Highest-count key; ties break toward the first key ever recorded.
    pub most_common_error: Option<String>,
    /// Distinct operations whose eventual success followed at least one
    /// recorded failure.
    pub successful_retry_count: usize,
}

#[derive(Default)]
struct ReporterInner {
    history: Vec<AttemptRecord>,
    counts: HashMap<String, u64>,
    // Keys in first-recorded order, for deterministic tie-breaking.
    count_order: Vec<String>,
    recovered_operations: HashSet<String>,
}

/// Passive sink for attempt outcomes.
#[derive(Default)]
pub struct ErrorReporter {
    inner: Mutex<ReporterInner>,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed attempt.
    pub fn record(&self, attempt: AttemptRecord) {
        let key = attempt
            .error_code
            .clone()
            .unwrap_or_else(|| attempt.message.clone());

        let mut inner = self.inner.lock().expect("reporter mutex poisoned");
        if !inner.counts.contains_key(&key) {
            inner.count_order.push(key.clone());
        }
        *inner.counts.entry(key).or_insert(0) += 1;
        inner.history.push(attempt);
    }

    /// Note that an operation succeeded after at least one failed attempt.
    pub fn record_recovery(&self, operation_name: &str) {
        let mut inner = self.inner.lock().expect("reporter mutex poisoned");
        inner.recovered_operations.insert(operation_name.to_string());
    }

    /// Snapshot the aggregated state.
    pub fn report(&self) -> ErrorReport {
        let inner = self.inner.lock().expect("reporter mutex poisoned");

        let mut most_common: Option<(&String, u64)> = None;
        for key in &inner.count_order {
            let count = inner.counts[key];
            // Strictly greater keeps the first-recorded key on ties.
            if most_common.map_or(true, |(_, best)| count > best) {
                most_common = Some((key, count));
            }
        }

        ErrorReport {
            total_errors: inner.history.len() as u64,
            error_counts: inner.counts.clone(),
            history: inner.history.clone(),
            most_common_error: most_common.map(|(key, _)| key.clone()),
            successful_retry_count: inner.recovered_operations.len(),
        }
    }

    /// Discard all recorded state.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().expect("reporter mutex poisoned");
        *inner = ReporterInner::default();
    }
}
