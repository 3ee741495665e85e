//! Sausage Server - authoritative multiplayer server binary.

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use sausage_server::cli::{Cli, Command};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { host, port } => {
            info!("Starting sausage server");
            sausage_server::server::run(&host, port).await
        }
    }
}
