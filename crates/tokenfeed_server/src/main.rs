//! tokenfeed server binary.
//!
//! Loads configuration, opens the configured feed store and serves the
//! WebSocket feed until Ctrl-C.

use clap::Parser;
use std::path::PathBuf;
use tokenfeed_server::{StorageBackend, TokenfeedConfig, init_observability};
use tracing::info;

/// Command-line arguments for the feed server.
#[derive(Parser, Debug)]
#[command(name = "tokenfeed")]
#[command(about = "Live feed of tokens carrying a three-digit number of at least 800")]
#[command(version)]
struct Args {
    /// Configuration file (defaults to ./tokenfeed.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding configuration
    #[arg(short, long)]
    port: Option<u16>,

    /// Storage backend, overriding configuration
    #[arg(long)]
    backend: Option<StorageBackend>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let mut config = TokenfeedConfig::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.bind.set_port(port);
    }
    if let Some(backend) = args.backend {
        config.storage.backend = Some(backend);
        config.validate()?;
    }

    let guard = init_observability(&config.logging)?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting tokenfeed");

    let result = tokenfeed_server::run(config).await;
    guard.shutdown();
    Ok(result?)
}
