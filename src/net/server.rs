//! HTTP serving with bounded graceful shutdown.
//!
//! # Shutdown Sequence
//! ```text
//! shutdown canceled
//!     → stop accepting (listener dropped)
//!     → signal open connections to finish in-flight requests
//!     → wait up to `grace`
//!     → abort whatever is still running
//! ```
//!
//! The grace period starts at cancellation and is independent of the scope
//! that triggered it. Open connections are the tasks of one `JoinSet`, so
//! the drain can tell which finished and which were aborted.

use std::time::Duration;

use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto;
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::TaskError;

pub const READ_HEADER_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

/// Serve `router` on `listener` until `shutdown` is canceled, then drain.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
    grace: Duration,
) -> Result<(), TaskError> {
    let addr = listener
        .local_addr()
        .map_err(|e| TaskError::transport("local addr", e))?;
    tracing::info!(address = %addr, "Listen and serve");

    let mut builder = auto::Builder::new(TokioExecutor::new());
    builder
        .http1()
        .timer(TokioTimer::new())
        .header_read_timeout(READ_HEADER_TIMEOUT);

    let graceful = GracefulShutdown::new();
    let mut connections = JoinSet::new();
    let mut next_id: u64 = 0;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) if is_connection_error(&e) => {
                        tracing::debug!(error = %e, "Transient accept error");
                        continue;
                    }
                    Err(e) => return Err(TaskError::transport("accept", e)),
                };

                next_id += 1;
                let id = next_id;
                tracing::trace!(peer_addr = %peer, connection_id = id, "Connection accepted");

                let service = TowerToHyperService::new(router.clone());
                let conn = builder.serve_connection(TokioIo::new(stream), service);
                let conn = graceful.watch(conn.into_owned());

                connections.spawn(async move {
                    if let Err(e) = conn.await {
                        tracing::debug!(
                            peer_addr = %peer,
                            connection_id = id,
                            error = %e,
                            "Connection error"
                        );
                    }
                    tracing::trace!(connection_id = id, "Connection closed");
                });
            }
        }
    }

    drop(listener);
    tracing::info!(
        address = %addr,
        open_connections = connections.len(),
        grace_ms = grace.as_millis() as u64,
        "Draining connections"
    );

    let report = drain(graceful, connections, grace).await;
    tracing::info!(
        address = %addr,
        drained = report.drained,
        aborted = report.aborted,
        "Server stopped"
    );
    Ok(())
}

/// Connection outcomes of a shutdown drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Connections that finished on their own after shutdown began.
    pub drained: usize,
    /// Connections cut off when the grace period elapsed.
    pub aborted: usize,
}

/// Wait up to `grace` for watched connections to finish, abort the rest,
/// and join every connection task.
pub async fn drain(
    graceful: GracefulShutdown,
    mut connections: JoinSet<()>,
    grace: Duration,
) -> DrainReport {
    let mut report = DrainReport::default();

    tokio::select! {
        _ = graceful.shutdown() => {}
        _ = tokio::time::sleep(grace) => {
            tracing::warn!(
                remaining = connections.len(),
                "Shutdown grace period elapsed, aborting connections"
            );
            connections.abort_all();
        }
    }

    while let Some(joined) = connections.join_next().await {
        match joined {
            Err(e) if e.is_cancelled() => report.aborted += 1,
            _ => report.drained += 1,
        }
    }
    report
}

/// Bind `addr` and serve. Bind failures are transport errors.
pub async fn bind_and_serve(
    addr: &str,
    router: Router,
    shutdown: CancellationToken,
    grace: Duration,
) -> Result<(), TaskError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| TaskError::transport("bind", e))?;
    serve(listener, router, shutdown, grace).await
}

/// Per-connection failures that should not stop the accept loop.
fn is_connection_error(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::ConnectionReset
    )
}
