//! Chat service process harness.
//!
//! Supervises long-running listeners under a shared cancellation scope and
//! exposes a diagnostics surface (build info, runtime-mutable log level,
//! profiler snapshots).

pub mod config;
pub mod debug;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::ServiceConfig;
pub use debug::DebugServer;
pub use lifecycle::{TaskGroup, TaskUnit};
pub use observability::{LogLevel, LogLevelRegistry};
