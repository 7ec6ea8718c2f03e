//! plugin
//!
//! Host-facing entry point.
//!
//! The host calls [`StatsPlugin::load`] once at startup and
//! [`StatsPlugin::on_match_end`] once per finished match, on its main
//! sequence. `on_match_end` returns immediately; the export runs on a
//! background task that reports only through logs.
//!
//! If the foreign module cannot be located at load, the plugin stays
//! disabled for the life of the process and every trigger is a no-op.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tou_stats_exporter::bridge::fixture::MatchFixture;
//! use tou_stats_exporter::bridge::VersionGate;
//! use tou_stats_exporter::core::paths::StoragePaths;
//! use tou_stats_exporter::plugin::StatsPlugin;
//!
//! let temp = tempfile::tempdir().unwrap();
//! let runtime = Arc::new(MatchFixture::new().build());
//! let paths = StoragePaths::new(temp.path().to_path_buf(), None);
//!
//! let plugin = StatsPlugin::load(runtime, &VersionGate::default(), paths);
//! assert!(plugin.is_enabled());
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::bridge::{Bridge, LocateError, RuntimeRef, VersionGate};
use crate::core::config;
use crate::core::paths::StoragePaths;
use crate::export::{ExportOutcome, Pipeline, StatsSink};

/// Display name used in startup logs.
pub const PLUGIN_NAME: &str = "TownOfUs Stats Exporter";

/// Match statistics exporter plugin.
#[derive(Debug)]
pub struct StatsPlugin {
    state: PluginState,
    paths: StoragePaths,
    config_path: Option<PathBuf>,
    sink: Option<Arc<dyn StatsSink>>,
}

#[derive(Debug)]
enum PluginState {
    Enabled(Bridge),
    Disabled(LocateError),
}

impl StatsPlugin {
    /// Initialise the bridge.
    ///
    /// Never fails; a resolution error disables the plugin and is logged.
    pub fn load(runtime: RuntimeRef, gate: &VersionGate, paths: StoragePaths) -> Self {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            "{} loading", PLUGIN_NAME
        );

        let state = match Bridge::initialize(runtime, gate) {
            Ok(bridge) => {
                info!(
                    module = bridge.handle().module_name(),
                    verdict = %bridge.verdict(),
                    "bridge initialised; stats will be exported at the end of each match"
                );
                PluginState::Enabled(bridge)
            }
            Err(e) => {
                error!(error = %e, "bridge initialisation failed; plugin disabled");
                PluginState::Disabled(e)
            }
        };

        Self {
            state,
            paths,
            config_path: config::env_config_path(),
            sink: None,
        }
    }

    /// Read configuration from `path` before the default locations.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Send through `sink` instead of the configured endpoint.
    pub fn with_sink(mut self, sink: Arc<dyn StatsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.state, PluginState::Enabled(_))
    }

    /// The initialised bridge, if any.
    pub fn bridge(&self) -> Option<&Bridge> {
        match &self.state {
            PluginState::Enabled(bridge) => Some(bridge),
            PluginState::Disabled(_) => None,
        }
    }

    /// Why the plugin is disabled, if it is.
    pub fn disabled_reason(&self) -> Option<&LocateError> {
        match &self.state {
            PluginState::Disabled(e) => Some(e),
            PluginState::Enabled(_) => None,
        }
    }

    /// Handle the end of a match.
    ///
    /// Returns the background task, or `None` when nothing was started
    /// (plugin disabled or hide-and-seek match). The task carries no
    /// result; outcomes are logged.
    pub fn on_match_end(&self, runtime: &Handle) -> Option<JoinHandle<()>> {
        let bridge = match &self.state {
            PluginState::Enabled(bridge) => bridge.clone(),
            PluginState::Disabled(_) => {
                debug!("plugin disabled; match end ignored");
                return None;
            }
        };

        if bridge.runtime().session().is_hide_and_seek() {
            info!("hide-and-seek match; export skipped");
            return None;
        }

        let paths = self.paths.clone();
        let config_path = self.config_path.clone();
        let sink = self.sink.clone();

        Some(runtime.spawn(async move {
            let load_paths = paths.clone();
            let loaded = match tokio::task::spawn_blocking(move || {
                config::load(&load_paths, config_path.as_deref())
            })
            .await
            {
                Ok(Ok(loaded)) => loaded,
                Ok(Err(e)) => {
                    warn!(error = %e, "config unavailable; export skipped");
                    return;
                }
                Err(e) => {
                    error!(error = %e, "config load task failed; export skipped");
                    return;
                }
            };

            let mut pipeline = Pipeline::new(bridge, loaded.config, paths.backup_dir());
            if let Some(sink) = sink {
                pipeline = pipeline.with_sink(sink);
            }

            match pipeline.run().await {
                ExportOutcome::Sent { .. } => info!("export completed"),
                ExportOutcome::Skipped(reason) => debug!(?reason, "export not sent"),
                ExportOutcome::Failed { .. } => {}
            }
        }))
    }
}
