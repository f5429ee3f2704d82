//! Digest daemon library exports.
//!
//! This crate provides the CLI daemon binary for the chat-digest service.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (start, stop, status, check-config)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{check_config, show_status, start_daemon, stop_daemon};
