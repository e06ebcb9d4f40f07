//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGINT, SIGTERM, SIGQUIT)
//! - Cancel the root scope on the first signal
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A second signal forces immediate exit

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Exit code used when a second signal arrives during shutdown.
pub const FORCED_EXIT_CODE: i32 = 130;

#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv() => tracing::info!(signal = "SIGINT", "Signal received"),
        _ = sigterm.recv() => tracing::info!(signal = "SIGTERM", "Signal received"),
        _ = sigquit.recv() => tracing::info!(signal = "SIGQUIT", "Signal received"),
    }
    Ok(())
}

#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Cancel `root` when the process is asked to terminate.
pub fn cancel_on_signal(root: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            res = wait_for_shutdown_signal() => {
                if let Err(e) = res {
                    tracing::error!(error = %e, "Failed to install signal handlers");
                    return;
                }
            }
            _ = root.cancelled() => return,
        }

        tracing::info!("Shutdown signal received, stopping");
        root.cancel();

        if wait_for_shutdown_signal().await.is_ok() {
            tracing::warn!("Second shutdown signal received, forcing exit");
            std::process::exit(FORCED_EXIT_CODE);
        }
    })
}
