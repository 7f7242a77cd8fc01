//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Resolve the log filter from environment or config
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level when set
//! - Idempotent: repeated init attempts are ignored (tests share a process)

use tracing_subscriber::EnvFilter;

use crate::config::schema::ObservabilityConfig;

/// Initialize the logging subsystem.
///
/// Uses `RUST_LOG` when present, falling back to the configured level.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
