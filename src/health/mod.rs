//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Caller-defined probe battery (checker.rs):
//!     → run each named probe (through a small retry loop)
//!     → failures degrade the score, never abort the battery
//!     → HealthCheckResult { per-probe verdicts, score, healthy }
//! ```
//!
//! # Design Decisions
//! - Probes are opaque async closures; this crate knows nothing about what
//!   they reach for
//! - Healthy means a majority of probes pass unless the caller sets a
//!   stricter minimum
//! - Results are produced fresh per invocation, never persisted

pub mod checker;

pub use checker::{HealthCheckResult, HealthChecker, HealthProbe};
