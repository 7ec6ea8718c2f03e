//! export::pipeline
//!
//! One match, end to end: config gate, harvest, normalize, back up, send.
//!
//! # Failure handling
//!
//! Nothing escapes [`Pipeline::run`]. Every failure becomes an
//! [`ExportOutcome`] and a log line:
//!
//! | Stage | On failure | Level |
//! |-------|-----------|-------|
//! | mode check | skipped | info |
//! | config | skipped | info |
//! | harvest | fact replaced by its default | warn |
//! | empty roster | skipped | warn |
//! | backup | logged, send continues | warn |
//! | send | failed, no retry | error |

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use super::backup::write_backup;
use super::client::{HttpSink, SendError, SendReceipt, StatsSink};
use super::schema::ExportRecord;
use super::transform::{game_info, normalize};
use crate::bridge::Bridge;
use crate::core::config::{ApiConfig, ConfigError, Credentials};
use crate::harvest::Harvester;

/// Why a match was not exported.
#[derive(Debug)]
pub enum SkipReason {
    /// The match was the unscored hide-and-seek mode.
    HideAndSeek,
    /// The configuration does not permit exporting.
    Config(ConfigError),
    /// No roster could be read.
    EmptyRoster,
}

/// Result of one pipeline run.
#[derive(Debug)]
pub enum ExportOutcome {
    /// Nothing was sent.
    Skipped(SkipReason),
    /// The collector accepted the export.
    Sent {
        receipt: SendReceipt,
        backup: Option<PathBuf>,
    },
    /// Sending failed.
    Failed {
        error: SendError,
        backup: Option<PathBuf>,
    },
}

impl ExportOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, ExportOutcome::Sent { .. })
    }

    /// Backup written during this run, if any.
    pub fn backup(&self) -> Option<&Path> {
        match self {
            ExportOutcome::Sent { backup, .. } | ExportOutcome::Failed { backup, .. } => {
                backup.as_deref()
            }
            ExportOutcome::Skipped(_) => None,
        }
    }
}

/// Per-match export pipeline.
///
/// Owns everything a run needs so it can be moved into a background task.
#[derive(Debug, Clone)]
pub struct Pipeline {
    bridge: Bridge,
    config: ApiConfig,
    backup_dir: PathBuf,
    sink: Option<Arc<dyn StatsSink>>,
}

impl Pipeline {
    /// Create a pipeline that sends over HTTP to the configured endpoint.
    pub fn new(bridge: Bridge, config: ApiConfig, backup_dir: PathBuf) -> Self {
        Self {
            bridge,
            config,
            backup_dir,
            sink: None,
        }
    }

    /// Send through `sink` instead of the configured endpoint.
    pub fn with_sink(mut self, sink: Arc<dyn StatsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Harvest and normalize the current match without sending.
    ///
    /// Returns `None` if no roster could be read.
    pub fn prepare(&self, credentials: &Credentials) -> Option<ExportRecord> {
        let harvested = Harvester::new(&self.bridge).harvest();
        if harvested.roster.is_empty() {
            warn!("roster is empty; nothing to export");
            return None;
        }
        let info = game_info(&harvested.session);
        Some(normalize(&harvested, info, credentials))
    }

    /// Run the pipeline for the match that just ended.
    pub async fn run(&self) -> ExportOutcome {
        let session = self.bridge.runtime().session();
        if session.is_hide_and_seek() {
            info!("hide-and-seek match; export skipped");
            return ExportOutcome::Skipped(SkipReason::HideAndSeek);
        }

        let target = match self.config.export_target() {
            Ok(target) => target,
            Err(reason) => {
                info!(%reason, "export skipped");
                return ExportOutcome::Skipped(SkipReason::Config(reason));
            }
        };

        info!(lobby = %session.lobby_code, "exporting match statistics");
        let Some(record) = self.prepare(&target.credentials) else {
            return ExportOutcome::Skipped(SkipReason::EmptyRoster);
        };

        let backup = if target.save_local_backup {
            match write_backup(&self.backup_dir, &record).await {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(error = %e, "local backup failed");
                    None
                }
            }
        } else {
            None
        };

        let sink: Arc<dyn StatsSink> = match &self.sink {
            Some(sink) => Arc::clone(sink),
            None => Arc::new(HttpSink::new(&target.endpoint)),
        };

        match sink.send(&record).await {
            Ok(receipt) => {
                info!(
                    sink = sink.name(),
                    game_id = %record.game_info.game_id,
                    players = record.players.len(),
                    "match exported"
                );
                ExportOutcome::Sent { receipt, backup }
            }
            Err(error) => {
                error!(sink = sink.name(), %error, "export failed");
                ExportOutcome::Failed { error, backup }
            }
        }
    }
}
