//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Retry loop and circuit breakers produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges)
//!     → reporter.rs (append-only attempt history, aggregate counts)
//!
//! Consumers:
//!     → Log aggregation (stdout, file, remote)
//!     → Whatever metrics exporter the embedding application installs
//!     → report() snapshots shipped to caller-chosen sinks
//! ```
//!
//! # Design Decisions
//! - The reporter is an explicit shared instance, not a global
//! - Metrics go through the facade crate; exporters are the caller's choice
//! - Every failed attempt is recorded before any retry decision is made

pub mod logging;
pub mod metrics;
pub mod reporter;

pub use reporter::{AttemptRecord, ErrorReport, ErrorReporter};
