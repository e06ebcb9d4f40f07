//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; log level is the only runtime-mutable knob
//! - Validation separates syntactic (serde) from semantic checks
//! - Any failure is fatal and reported before a listener opens

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{DebugServerConfig, Environment, LogConfig, SentryConfig, ServiceConfig};
pub use validation::ValidationError;
