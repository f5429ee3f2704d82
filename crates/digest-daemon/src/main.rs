//! Chat Digest Daemon
//!
//! Embeds chat messages and serves personalized, quota-bounded digests
//! over HTTP.
//!
//! # Usage
//!
//! ```bash
//! digest-daemon start [--foreground] [--port PORT] [--state-dir PATH]
//! digest-daemon stop
//! digest-daemon status
//! digest-daemon check-config
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/chat-digest/config.toml)
//! 3. Environment variables (DIGEST_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use digest_daemon::{check_config, show_status, start_daemon, stop_daemon, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            foreground,
            port,
            state_dir,
        } => {
            start_daemon(
                cli.config.as_deref(),
                foreground,
                port,
                state_dir.as_deref(),
                cli.log_level.as_deref(),
            )
            .await?;
        }
        Commands::Stop => {
            stop_daemon()?;
        }
        Commands::Status => {
            show_status()?;
        }
        Commands::CheckConfig => {
            check_config(cli.config.as_deref())?;
        }
    }

    Ok(())
}
