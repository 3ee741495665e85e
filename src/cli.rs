//! Command-line interface for the sausage server.

use clap::{Parser, Subcommand};

/// Sausage Server - authoritative multiplayer board game server
#[derive(Parser, Debug)]
#[command(name = "sausage-server")]
#[command(about = "Authoritative server for the sausage placement game", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "31425")]
        port: u16,
    },
}
