//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value formats (log level names, `host:port` addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::observability::level::LogLevel;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("log.level: unknown level {0:?}")]
    LogLevel(String),

    #[error("servers.debug.addr: {0:?} is not host:port")]
    Address(String),

    #[error("servers.debug.shutdown_timeout_ms must be > 0")]
    ShutdownTimeout,

    #[error("sentry.dsn is required")]
    MissingDsn,
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.log.level.parse::<LogLevel>().is_err() {
        errors.push(ValidationError::LogLevel(config.log.level.clone()));
    }
    if !is_host_port(&config.servers.debug.addr) {
        errors.push(ValidationError::Address(config.servers.debug.addr.clone()));
    }
    if config.servers.debug.shutdown_timeout_ms == 0 {
        errors.push(ValidationError::ShutdownTimeout);
    }
    if config.sentry.dsn.trim().is_empty() {
        errors.push(ValidationError::MissingDsn);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Exactly one `:` with a non-empty port. The host may be empty (`:8080`).
pub fn is_host_port(addr: &str) -> bool {
    match addr.split_once(':') {
        Some((_, port)) => !port.is_empty() && !port.contains(':'),
        None => false,
    }
}
