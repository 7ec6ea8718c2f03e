//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Async Commands
//!
//! `export` sends over the network, so it builds a tokio runtime and
//! blocks on the pipeline. Everything else is synchronous.

mod completion;
mod config_cmd;
mod export;
mod inspect;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use config_cmd::{init as config_init, show as config_show};
pub use export::{export, ExportArgs};
pub use inspect::inspect;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::args::{Command, ConfigAction};
use crate::bridge::{snapshot, Bridge, VersionGate};

/// Dispatch a command to its handler.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Export {
            snapshot,
            config,
            backup_dir,
            dry_run,
        } => export::export(ExportArgs {
            snapshot,
            config,
            backup_dir,
            dry_run,
        }),
        Command::Inspect { snapshot } => inspect::inspect(&snapshot),
        Command::Config { action } => match action {
            ConfigAction::Init { path, force } => config_cmd::init(path.as_deref(), force),
            ConfigAction::Show { config } => config_cmd::show(config.as_deref()),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Load a snapshot and initialise the bridge against it.
pub(crate) fn open_bridge(snapshot_path: &Path) -> Result<Bridge> {
    let runtime = snapshot::load(snapshot_path)
        .with_context(|| format!("Failed to load snapshot {}", snapshot_path.display()))?;
    Bridge::initialize(Arc::new(runtime), &VersionGate::default())
        .context("Failed to initialise bridge")
}
