//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to remote operation:
//!     → timeouts.rs (optional per-attempt deadline)
//!     → circuit_breaker.rs (fail fast while the key's circuit is open)
//!     → retries.rs (record failure, classify, backoff, retry)
//!         → classify.rs (transient vs permanent)
//!         → backoff.rs (exponential delay + jitter)
//! ```
//!
//! # Design Decisions
//! - Retry loop and circuit breakers compose but do not depend on each other
//! - Every failed attempt is recorded before any retry decision
//! - Classification is pure; all mutable state sits in explicit structs

pub mod backoff;
pub mod circuit_breaker;
pub mod classify;
pub mod retries;
pub mod timeouts;
pub mod types;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerRegistry, CircuitSnapshot, CircuitState};
pub use retries::RetryExecutor;
pub use types::{BreakerError, ErrorKind, GuardError, GuardResult, RemoteError};
