//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (delays > 0, thresholds > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GuardConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::GuardConfig;

const KNOWN_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("retry.base_delay_ms must be greater than 0")]
    ZeroBaseDelay,

    #[error("retry.max_delay_ms ({max}) must be at least retry.base_delay_ms ({base})")]
    DelayCapBelowBase { base: u64, max: u64 },

    #[error("circuit_breaker.failure_threshold must be greater than 0")]
    ZeroFailureThreshold,

    #[error("circuit_breaker.reset_timeout_ms must be greater than 0")]
    ZeroResetTimeout,

    #[error("observability.log_level '{0}' is not one of trace/debug/info/warn/error")]
    UnknownLogLevel(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.retry.base_delay_ms == 0 {
        errors.push(ValidationError::ZeroBaseDelay);
    } else if config.retry.max_delay_ms < config.retry.base_delay_ms {
        errors.push(ValidationError::DelayCapBelowBase {
            base: config.retry.base_delay_ms,
            max: config.retry.max_delay_ms,
        });
    }

    if config.circuit_breaker.failure_threshold == 0 {
        errors.push(ValidationError::ZeroFailureThreshold);
    }
    if config.circuit_breaker.reset_timeout_ms == 0 {
        errors.push(ValidationError::ZeroResetTimeout);
    }

    if !KNOWN_LOG_LEVELS.contains(&config.observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
