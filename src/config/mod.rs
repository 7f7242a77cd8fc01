//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GuardConfig (validated, immutable)
//!     → shared via Arc to executors, registries, checkers
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::CircuitBreakerConfig;
pub use schema::GuardConfig;
pub use schema::HealthCheckConfig;
pub use schema::RetryPolicy;
