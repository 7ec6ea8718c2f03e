//! export command - Harvest a snapshot and send it to the collector

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};

use super::open_bridge;
use crate::core::config::{self, ApiConfig};
use crate::core::paths::StoragePaths;
use crate::export::{ExportOutcome, Pipeline, SkipReason};

/// Arguments for the export command.
#[derive(Debug, Clone)]
pub struct ExportArgs {
    pub snapshot: PathBuf,
    pub config: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub dry_run: bool,
}

/// Export the match in a snapshot.
pub fn export(args: ExportArgs) -> Result<()> {
    let bridge = open_bridge(&args.snapshot)?;
    let (config, backup_dir) = resolve_config(&args)?;

    let pipeline = Pipeline::new(bridge, config.clone(), backup_dir);

    if args.dry_run {
        let credentials = config
            .export_target()
            .map(|t| t.credentials)
            .unwrap_or_default();
        let Some(mut record) = pipeline.prepare(&credentials) else {
            bail!("No roster found in snapshot");
        };
        if !record.token.is_empty() {
            record.token = "********".to_string();
        }
        if record.secret.is_some() {
            record.secret = Some("********".to_string());
        }
        let json = serde_json::to_string_pretty(&record).context("Failed to encode payload")?;
        println!("{}", json);
        return Ok(());
    }

    let rt = tokio::runtime::Runtime::new()?;
    match rt.block_on(pipeline.run()) {
        ExportOutcome::Sent { receipt, backup } => {
            println!("Export sent (HTTP {})", receipt.status);
            if let Some(path) = backup {
                println!("Backup written to {}", path.display());
            }
            Ok(())
        }
        ExportOutcome::Skipped(reason) => {
            match reason {
                SkipReason::HideAndSeek => println!("Skipped: hide-and-seek match"),
                SkipReason::Config(e) => println!("Skipped: {}", e),
                SkipReason::EmptyRoster => println!("Skipped: no roster found"),
            }
            Ok(())
        }
        ExportOutcome::Failed { error, backup } => {
            if let Some(path) = backup {
                println!("Backup written to {}", path.display());
            }
            Err(error).context("Export failed")
        }
    }
}

/// Config and backup directory for a run.
fn resolve_config(args: &ExportArgs) -> Result<(ApiConfig, PathBuf)> {
    let discover = || StoragePaths::discover().context("Failed to locate documents directory");

    let config = match &args.config {
        Some(path) => config::read(path)?,
        None => {
            let explicit = config::env_config_path();
            config::load(&discover()?, explicit.as_deref())?.config
        }
    };

    let backup_dir = match &args.backup_dir {
        Some(dir) => dir.clone(),
        None => discover()?.backup_dir(),
    };

    Ok((config, backup_dir))
}
