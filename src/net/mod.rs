//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → server.rs (accept loop, hyper connection, graceful drain)
//!     → axum Router
//!
//! Connection States:
//!     Active → Draining → Closed (or Aborted after the grace period)
//! ```

pub mod server;

pub use server::{bind_and_serve, drain, serve, DrainReport, DEFAULT_SHUTDOWN_TIMEOUT};
