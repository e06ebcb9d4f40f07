//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Initialize subsystems → Run task group
//!
//! Supervision (supervisor.rs):
//!     Units run concurrently → first failure or signal cancels all → join
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT/SIGQUIT → cancel root scope
//! ```
//!
//! # Design Decisions
//! - Cancellation scopes are explicit `CancellationToken`s, never ambient
//! - Every listener drains within its own grace period (see `net::server`)

pub mod signals;
pub mod startup;
pub mod supervisor;
pub mod task;

pub use supervisor::{GroupState, SupervisionError, TaskGroup};
pub use task::{task_fn, TaskError, TaskUnit};
