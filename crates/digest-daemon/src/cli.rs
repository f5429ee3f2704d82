//! CLI argument parsing for the digest daemon.

use clap::{Parser, Subcommand};

/// Chat Digest Daemon
///
/// Serves the embedding ingestion and personalized retrieval endpoints.
#[derive(Parser, Debug)]
#[command(name = "digest-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/chat-digest/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the digest service
    Start {
        /// Run in foreground (don't daemonize)
        #[arg(short, long)]
        foreground: bool,

        /// Override HTTP port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override state directory (tuning scopes, watermarks)
        #[arg(long)]
        state_dir: Option<String>,
    },

    /// Stop the running daemon
    Stop,

    /// Show daemon status
    Status,

    /// Validate configuration and print the resolved values
    CheckConfig,
}
