//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.
//! Every section is required; only the shutdown grace period has a default.

use serde::{Deserialize, Serialize};

/// Root configuration for the chat service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Process-wide settings.
    pub global: GlobalConfig,

    /// Initial logging settings.
    pub log: LogConfig,

    /// Listener definitions.
    pub servers: ServersConfig,

    /// Error reporting endpoint.
    pub sentry: SentryConfig,
}

/// Operating environment tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Stage,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Stage => "stage",
            Environment::Prod => "prod",
        }
    }

    /// Stage and prod emit machine-readable logs.
    pub fn is_production_like(&self) -> bool {
        !matches!(self, Environment::Dev)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    pub env: Environment,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Initial log level (debug, info, warn, error, dpanic, panic, fatal).
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServersConfig {
    pub debug: DebugServerConfig,
}

/// Diagnostics listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DebugServerConfig {
    /// Bind address (e.g., "127.0.0.1:8079").
    pub addr: String,

    /// Grace period for draining in-flight requests on shutdown, in milliseconds.
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

fn default_shutdown_timeout_ms() -> u64 {
    3_000
}

/// Error reporting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SentryConfig {
    /// Client key / endpoint. Required.
    pub dsn: String,
}
