//! Metrics collection and exposition.
//!
//! # Metrics
//! - `debug_requests_total` (counter): diagnostics requests by path, status
//! - `debug_log_level_changes_total` (counter): successful level mutations by level
//! - `supervisor_task_exits_total` (counter): unit exits by outcome
//!
//! # Design Decisions
//! - No dedicated listener: the rendered snapshot is served by the
//!   diagnostics `metrics` profile

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::observability::logging::InitError;

/// Install the global Prometheus recorder.
pub fn init_metrics() -> Result<PrometheusHandle, InitError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| InitError::Metrics(e.to_string()))?;
    tracing::info!("Metrics recorder installed");
    Ok(handle)
}

pub fn record_debug_request(path: &str, status: u16) {
    counter!(
        "debug_requests_total",
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_level_change(level: &str) {
    counter!("debug_log_level_changes_total", "level" => level.to_string()).increment(1);
}

pub fn record_task_exit(outcome: &'static str) {
    counter!("supervisor_task_exits_total", "outcome" => outcome).increment(1);
}
