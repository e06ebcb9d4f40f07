//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging, metrics and error reporting in dependency order
//! - Register listeners in the task group and run it until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::{self, ConfigError};
use crate::debug::{DebugServer, DebugServerOptions, ProcessProfiler, ServerError};
use crate::lifecycle::supervisor::{SupervisionError, TaskGroup};
use crate::observability::buildinfo::{self, BuildInfo};
use crate::observability::logging::{self, InitError, LoggingOptions};
use crate::observability::metrics;
use crate::observability::{ErrorReporter, LogReporter};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("parse and validate config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error("init observability: {0}")]
    Init(#[from] InitError),

    #[error("read build info: {0}")]
    BuildInfo(#[from] serde_json::Error),

    #[error("init debug server: {0}")]
    DebugServer(#[from] ServerError),

    #[error("wait app stop: {0}")]
    Supervision(#[from] SupervisionError),
}

/// Run the service until `root` is canceled or a listener fails.
pub async fn run(config_path: &Path, root: CancellationToken) -> Result<(), AppError> {
    let cfg = config::load_config(config_path).map_err(|source| AppError::Config {
        path: config_path.to_path_buf(),
        source,
    })?;

    let levels = logging::init(
        &LoggingOptions::new(&cfg.log.level).with_json(cfg.global.env.is_production_like()),
    )?;
    tracing::info!(
        version = buildinfo::VERSION,
        env = %cfg.global.env,
        level = %levels.current(),
        "chat-service starting"
    );

    let metrics_handle = metrics::init_metrics()?;
    let reporter = LogReporter::new(&cfg.sentry, cfg.global.env, buildinfo::VERSION);
    let build_info = Arc::new(BuildInfo::from_build()?);

    let debug = DebugServer::new(
        DebugServerOptions::new(&cfg.servers.debug.addr)
            .with_shutdown_timeout(Duration::from_millis(cfg.servers.debug.shutdown_timeout_ms)),
        levels,
        build_info,
        Arc::new(ProcessProfiler::new(Some(metrics_handle))),
    )?;

    let mut group = TaskGroup::new();
    // Servers.
    group.spawn(Box::new(debug));
    // Domain services register here.

    if let Err(err) = group.run(&root).await {
        reporter.report(&err);
        return Err(err.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
