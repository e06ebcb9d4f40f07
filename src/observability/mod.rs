//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, filtered by level.rs)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout (JSON or human-readable)
//!     → diagnostics server (/log/level, /version, /debug/profile/metrics)
//!     → reporter.rs (fatal errors)
//! ```
//!
//! # Design Decisions
//! - Log level is an injected registry, not hidden global state
//! - Build info is captured once by the build script and never changes

pub mod buildinfo;
pub mod level;
pub mod logging;
pub mod metrics;
pub mod reporter;

pub use buildinfo::BuildInfo;
pub use level::{InvalidLevel, LogLevel, LogLevelRegistry, SetLevelError};
pub use logging::{InitError, LoggingOptions};
pub use reporter::{ErrorReporter, LogReporter};
