//! Process profiler boundary.
//!
//! The diagnostics server only routes `/debug/profile/{name}` to a
//! [`Profiler`]; what a snapshot contains is up to the implementation.

use std::ffi::OsString;
use std::fmt;

use metrics_exporter_prometheus::PrometheusHandle;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    Cmdline,
    Tasks,
    Metrics,
    Heap,
    Cpu,
    Trace,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 6] = [
        ProfileKind::Cmdline,
        ProfileKind::Tasks,
        ProfileKind::Metrics,
        ProfileKind::Heap,
        ProfileKind::Cpu,
        ProfileKind::Trace,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProfileKind::Cmdline => "cmdline",
            ProfileKind::Tasks => "tasks",
            ProfileKind::Metrics => "metrics",
            ProfileKind::Heap => "heap",
            ProfileKind::Cpu => "profile",
            ProfileKind::Trace => "trace",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProfileKind::Cmdline => "Process command line",
            ProfileKind::Tasks => "Async runtime task counts",
            ProfileKind::Metrics => "Prometheus metrics snapshot",
            ProfileKind::Heap => "Heap profile",
            ProfileKind::Cpu => "CPU profile",
            ProfileKind::Trace => "Execution trace",
        }
    }

    pub fn path(&self) -> String {
        format!("/debug/profile/{}", self.name())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ProfileKind::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Snapshot {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            content_type: "text/plain; charset=utf-8",
            body: body.into().into_bytes(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile {0} is not supported by this process")]
    Unsupported(ProfileKind),

    #[error("profile {kind} failed: {message}")]
    Failed { kind: ProfileKind, message: String },
}

pub trait Profiler: Send + Sync {
    fn snapshot(&self, kind: ProfileKind) -> Result<Snapshot, ProfileError>;
}

/// Profiler backed by what the process can report about itself.
pub struct ProcessProfiler {
    metrics: Option<PrometheusHandle>,
}

impl ProcessProfiler {
    pub fn new(metrics: Option<PrometheusHandle>) -> Self {
        Self { metrics }
    }
}

impl Profiler for ProcessProfiler {
    fn snapshot(&self, kind: ProfileKind) -> Result<Snapshot, ProfileError> {
        match kind {
            ProfileKind::Cmdline => {
                Ok(Snapshot::text(join_args(std::env::args_os())))
            }
            ProfileKind::Tasks => {
                let handle =
                    tokio::runtime::Handle::try_current().map_err(|e| ProfileError::Failed {
                        kind,
                        message: e.to_string(),
                    })?;
                let metrics = handle.metrics();
                Ok(Snapshot::text(format!(
                    "workers: {}\nalive_tasks: {}\n",
                    metrics.num_workers(),
                    metrics.num_alive_tasks()
                )))
            }
            ProfileKind::Metrics => match &self.metrics {
                Some(handle) => Ok(Snapshot {
                    content_type: "text/plain; version=0.0.4",
                    body: handle.render().into_bytes(),
                }),
                None => Err(ProfileError::Unsupported(kind)),
            },
            ProfileKind::Heap | ProfileKind::Cpu | ProfileKind::Trace => {
                Err(ProfileError::Unsupported(kind))
            }
        }
    }
}

/// NUL-separated argv. Non-UTF-8 arguments are converted lossily.
fn join_args(args: impl IntoIterator<Item = OsString>) -> String {
    args.into_iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("\0")
}
