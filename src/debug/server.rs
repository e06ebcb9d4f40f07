//! Diagnostics listener as a supervised task.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::validation::is_host_port;
use crate::debug::profiler::Profiler;
use crate::debug::setup_debug_router;
use crate::lifecycle::{TaskError, TaskUnit};
use crate::net::{self, DEFAULT_SHUTDOWN_TIMEOUT};
use crate::observability::{BuildInfo, LogLevelRegistry};

pub const NAME: &str = "server-debug";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validate options: {0:?} is not host:port")]
    InvalidAddress(String),
}

#[derive(Debug, Clone)]
pub struct DebugServerOptions {
    addr: String,
    shutdown_timeout: Duration,
}

impl DebugServerOptions {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

pub struct DebugServer {
    addr: String,
    shutdown_timeout: Duration,
    router: Router,
}

impl DebugServer {
    pub fn new(
        options: DebugServerOptions,
        levels: Arc<LogLevelRegistry>,
        build_info: Arc<BuildInfo>,
        profiler: Arc<dyn Profiler>,
    ) -> Result<Self, ServerError> {
        if !is_host_port(&options.addr) {
            return Err(ServerError::InvalidAddress(options.addr));
        }

        Ok(Self {
            addr: options.addr,
            shutdown_timeout: options.shutdown_timeout,
            router: setup_debug_router(levels, build_info, profiler),
        })
    }

    /// The request handler, for serving on a caller-provided listener or in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on an already-bound listener.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<(), TaskError> {
        net::serve(listener, self.router, shutdown, self.shutdown_timeout).await
    }
}

#[async_trait]
impl TaskUnit for DebugServer {
    fn name(&self) -> &str {
        NAME
    }

    async fn run(self: Box<Self>, shutdown: CancellationToken) -> Result<(), TaskError> {
        net::bind_and_serve(&self.addr, self.router, shutdown, self.shutdown_timeout).await
    }
}
