//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global `tracing` subscriber
//! - Wire the level filter to a [`LogLevelRegistry`] so it can change at runtime
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for stage/prod, human-readable format for dev
//! - The level filter sits in a `reload` layer directly on the registry

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload};

use crate::observability::level::{InvalidLevel, LogLevel, LogLevelRegistry};

#[derive(Debug, Error)]
pub enum InitError {
    #[error("parse log level: {0}: {1:?}")]
    Level(InvalidLevel, String),

    #[error("install subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),

    #[error("install metrics recorder: {0}")]
    Metrics(String),
}

#[derive(Debug, Clone)]
pub struct LoggingOptions {
    pub level: String,
    pub json: bool,
}

impl LoggingOptions {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            json: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

/// Install the global subscriber and return the registry controlling it.
///
/// Fails if a global subscriber is already set.
pub fn init(options: &LoggingOptions) -> Result<Arc<LogLevelRegistry>, InitError> {
    let level: LogLevel = options
        .level
        .parse()
        .map_err(|e| InitError::Level(e, options.level.clone()))?;

    let (filter, handle) = reload::Layer::new(level.as_filter());

    let json_layer = options.json.then(|| {
        fmt::layer()
            .json()
            .with_current_span(false)
            .with_target(true)
    });
    let text_layer = (!options.json).then(|| fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()?;

    tracing::debug!(level = %level, json = options.json, "Logger initialized");

    Ok(Arc::new(LogLevelRegistry::with_sink(level, handle)))
}
