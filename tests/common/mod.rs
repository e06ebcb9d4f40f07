//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chat_service::debug::{DebugServer, DebugServerOptions, ProcessProfiler};
use chat_service::lifecycle::TaskError;
use chat_service::observability::{BuildInfo, LogLevel, LogLevelRegistry};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Running {
    pub addr: SocketAddr,
    pub shutdown: CancellationToken,
    pub handle: JoinHandle<Result<(), TaskError>>,
}

impl Running {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Cancel and wait for the server to return.
    pub async fn stop(self) -> Result<(), TaskError> {
        self.shutdown.cancel();
        self.handle.await.expect("server task panicked")
    }
}

/// Start a debug server on an ephemeral port.
#[allow(dead_code)]
pub async fn start_debug_server(initial: LogLevel) -> (Running, Arc<LogLevelRegistry>) {
    let levels = Arc::new(LogLevelRegistry::new(initial));
    let server = DebugServer::new(
        DebugServerOptions::new("127.0.0.1:0"),
        Arc::clone(&levels),
        Arc::new(BuildInfo::from_build().unwrap()),
        Arc::new(ProcessProfiler::new(None)),
    )
    .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(server.serve(listener, shutdown.clone()));

    (
        Running {
            addr,
            shutdown,
            handle,
        },
        levels,
    )
}

/// Serve an arbitrary router with the given grace period.
#[allow(dead_code)]
pub async fn start_router(router: Router, grace: Duration) -> Running {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(chat_service::net::serve(
        listener,
        router,
        shutdown.clone(),
        grace,
    ));

    Running {
        addr,
        shutdown,
        handle,
    }
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
