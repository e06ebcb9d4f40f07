//! Crash/error reporting boundary.
//!
//! The reporting transport is an external service. [`ErrorReporter`] is the
//! seam; [`LogReporter`] is the in-process implementation that tags reports
//! with environment and release and writes them to the log.

use std::error::Error;

use crate::config::{Environment, SentryConfig};

pub trait ErrorReporter: Send + Sync {
    fn report(&self, err: &(dyn Error + 'static));
}

#[derive(Debug, Clone)]
pub struct LogReporter {
    env: Environment,
    release: String,
}

impl LogReporter {
    pub fn new(config: &SentryConfig, env: Environment, release: impl Into<String>) -> Self {
        let reporter = Self {
            env,
            release: release.into(),
        };
        tracing::info!(
            target: "error-reporter",
            env = %reporter.env,
            release = %reporter.release,
            dsn_configured = !config.dsn.is_empty(),
            "Error reporter initialized"
        );
        reporter
    }
}

impl ErrorReporter for LogReporter {
    fn report(&self, err: &(dyn Error + 'static)) {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        tracing::error!(
            target: "error-reporter",
            env = %self.env,
            release = %self.release,
            error = %err,
            causes = ?chain,
            "Reporting error"
        );
    }
}
