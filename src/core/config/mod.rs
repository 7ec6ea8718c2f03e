//! core::config
//!
//! Configuration loading.
//!
//! # Locations
//!
//! Searched in order, first existing file wins:
//! 1. An explicit path (`$TOU_STATS_CONFIG` or a command-line flag)
//! 2. `<game dir>/ApiSet.ini`
//! 3. `<documents>/TownOfUs/ApiSet.ini` (canonical write location)
//!
//! When no file exists, a commented default file is written to the
//! canonical location and defaults are used. Defaults never export.
//!
//! # Example
//!
//! ```no_run
//! use tou_stats_exporter::core::config::load;
//! use tou_stats_exporter::core::paths::StoragePaths;
//!
//! let paths = StoragePaths::discover().unwrap();
//! let result = load(&paths, None).unwrap();
//!
//! match result.config.export_target() {
//!     Ok(target) => println!("exporting to {}", target.endpoint),
//!     Err(reason) => println!("export skipped: {}", reason),
//! }
//! ```

pub mod schema;

pub use schema::{ApiConfig, Credentials, ExportTarget, DEFAULT_CONFIG};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use super::paths::{StoragePaths, CONFIG_ENV};

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Export is turned off.
    #[error("API export is disabled")]
    Disabled,

    /// Export is on but a required value is blank.
    #[error("API export is enabled but {0} is not set")]
    Incomplete(&'static str),

    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write config file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("documents directory not found")]
    NoDocumentsDir,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: ApiConfig,
    /// File the configuration was read from, if any.
    pub loaded_from: Option<PathBuf>,
    /// Default file written because none existed.
    pub created: Option<PathBuf>,
}

/// Explicit configuration path from the environment.
pub fn env_config_path() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Load configuration from the first existing search path.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read, or if the
/// default file cannot be written.
pub fn load(paths: &StoragePaths, explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
    let search = paths.config_search_paths(explicit);

    for path in &search {
        if path.is_file() {
            info!(path = %path.display(), "reading config");
            let config = read(path)?;
            info!(enabled = config.enable_api_export, "config loaded");
            return Ok(ConfigLoadResult {
                config,
                loaded_from: Some(path.clone()),
                created: None,
            });
        }
    }

    let default_path = paths.user_config_path();
    write_default(&default_path)?;
    warn!(path = %default_path.display(), "no config found; default config created");

    Ok(ConfigLoadResult {
        config: ApiConfig::default(),
        loaded_from: None,
        created: Some(default_path),
    })
}

/// Read and parse a config file.
pub fn read(path: &Path) -> Result<ApiConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(ApiConfig::parse(&contents))
}

/// Write the default config file atomically.
///
/// Creates parent directories if needed. The file is written to a
/// temporary sibling and renamed into place.
pub fn write_default(path: &Path) -> Result<(), ConfigError> {
    let write_err = |p: &Path| {
        let p = p.to_path_buf();
        move |e| ConfigError::Write { path: p, source: e }
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err(path))?;
    }

    let temp_path = path.with_extension("ini.tmp");
    let mut file = fs::File::create(&temp_path).map_err(write_err(&temp_path))?;
    file.write_all(DEFAULT_CONFIG.as_bytes())
        .map_err(write_err(&temp_path))?;
    file.sync_all().map_err(write_err(&temp_path))?;

    fs::rename(&temp_path, path).map_err(write_err(path))?;
    Ok(())
}
