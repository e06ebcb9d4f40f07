use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "debug-cli")]
#[command(about = "Operator CLI for the chat-service diagnostics server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8079")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show build information
    Version,
    /// Show the current log level
    Level,
    /// Change the log level
    SetLevel {
        /// debug, info, warn, error, dpanic, panic or fatal
        level: String,
    },
    /// List profiler actions
    Profiles,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Version => client.get(format!("{}/version", cli.url)).send().await?,
        Commands::Level => client.get(format!("{}/log/level", cli.url)).send().await?,
        Commands::SetLevel { level } => {
            client
                .put(format!("{}/log/level", cli.url))
                .json(&json!({ "level": level }))
                .send()
                .await?
        }
        Commands::Profiles => {
            client
                .get(format!("{}/debug/profile/", cli.url))
                .send()
                .await?
        }
    };

    if !print_response(res).await? {
        std::process::exit(1);
    }
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<bool, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: debug server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(false);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(true)
}
