//! cli
//!
//! Command-line interface for `tou-stats`.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the tracing subscriber
//! - Delegate to command handlers
//!
//! The CLI drives the same bridge, harvester and pipeline the plugin uses,
//! with a JSON snapshot standing in for the live game process.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::Result;
use tracing::Level;

use crate::telemetry;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    telemetry::init_tracing(cli.json_logs, level);

    commands::dispatch(cli.command)
}
