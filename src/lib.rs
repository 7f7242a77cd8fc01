//! Resilience layer for fallible remote operations.
//!
//! Wraps calls against an external network service with bounded retries,
//! exponential backoff with jitter, per-operation circuit breaking, and
//! structured failure observability. Callers hand over an opaque async
//! operation plus a name and optional context; this crate decides what is
//! worth retrying and keeps the audit trail.

pub mod config;
pub mod health;
pub mod observability;
pub mod resilience;

pub use config::GuardConfig;
pub use health::{HealthCheckResult, HealthChecker, HealthProbe};
pub use observability::{AttemptRecord, ErrorReport, ErrorReporter};
pub use resilience::{
    BreakerError, CircuitBreaker, CircuitBreakerRegistry, CircuitState, ErrorKind, GuardError,
    GuardResult, RemoteError, RetryExecutor,
};
