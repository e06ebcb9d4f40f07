//! chat-service entry point.
//!
//! # Architecture Overview
//!
//! ```text
//!   SIGINT/SIGTERM ──▶ root CancellationToken
//!                              │
//!                              ▼
//!                  ┌───────────────────────┐
//!                  │       TaskGroup       │  first error cancels all,
//!                  │                       │  joins every unit
//!                  │  ┌─────────────────┐  │
//!                  │  │  server-debug   │──┼──▶ /version, /log/level,
//!                  │  └─────────────────┘  │    /debug/profile/*
//!                  │  ┌─────────────────┐  │
//!                  │  │ domain services │  │
//!                  │  └─────────────────┘  │
//!                  └───────────────────────┘
//!                              │
//!          LogLevelRegistry ◀──┴──▶ tracing subscriber (reload layer)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use chat_service::lifecycle::{signals, startup};

#[derive(Parser)]
#[command(name = "chat-service")]
#[command(about = "Chat service")]
struct Cli {
    /// Path to config file
    #[arg(long, default_value = "configs/config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let root = CancellationToken::new();
    let _signals = signals::cancel_on_signal(root.clone());

    match startup::run(&cli.config, root).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("run app: {e}");
            ExitCode::FAILURE
        }
    }
}
