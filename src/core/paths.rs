//! core::paths
//!
//! Centralized path routing for exporter storage locations.
//!
//! # Storage Layout
//!
//! Per-user data lives under `<documents>/TownOfUs/`:
//! - `ApiSet.ini` - Exporter configuration (canonical write location)
//! - `GameLogs/` - Local match backups
//!
//! A configuration file next to the game executable takes precedence over
//! the per-user one.
//!
//! # Example
//!
//! ```
//! use tou_stats_exporter::core::paths::StoragePaths;
//! use std::path::PathBuf;
//!
//! let paths = StoragePaths::new(PathBuf::from("/home/me/Documents"), None);
//!
//! assert_eq!(
//!     paths.backup_dir(),
//!     PathBuf::from("/home/me/Documents/TownOfUs/GameLogs")
//! );
//! ```

use std::path::{Path, PathBuf};

use super::config::ConfigError;

/// Folder under the documents directory holding all exporter data.
pub const DATA_FOLDER: &str = "TownOfUs";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "ApiSet.ini";

/// Backup folder under the data folder.
pub const BACKUP_FOLDER: &str = "GameLogs";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "TOU_STATS_CONFIG";

/// Centralized path routing for exporter storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    /// The user's documents directory.
    pub documents_dir: PathBuf,

    /// Directory of the game installation, if known.
    pub game_dir: Option<PathBuf>,
}

impl StoragePaths {
    pub fn new(documents_dir: PathBuf, game_dir: Option<PathBuf>) -> Self {
        Self {
            documents_dir,
            game_dir,
        }
    }

    /// Resolve paths for the current user and executable.
    ///
    /// The documents directory falls back to the home directory on
    /// platforms without one. The game directory is the directory of the
    /// running executable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoDocumentsDir` if neither exists.
    pub fn discover() -> Result<Self, ConfigError> {
        let documents_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .ok_or(ConfigError::NoDocumentsDir)?;
        let game_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Ok(Self::new(documents_dir, game_dir))
    }

    /// `<documents>/TownOfUs`
    pub fn data_dir(&self) -> PathBuf {
        self.documents_dir.join(DATA_FOLDER)
    }

    /// `<documents>/TownOfUs/GameLogs`
    pub fn backup_dir(&self) -> PathBuf {
        self.data_dir().join(BACKUP_FOLDER)
    }

    /// `<documents>/TownOfUs/ApiSet.ini`
    pub fn user_config_path(&self) -> PathBuf {
        self.data_dir().join(CONFIG_FILE_NAME)
    }

    /// `<game dir>/ApiSet.ini`, if the game directory is known.
    pub fn game_config_path(&self) -> Option<PathBuf> {
        self.game_dir.as_ref().map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Configuration files to try, in order.
    ///
    /// The last entry is always the per-user path, which is where a
    /// default file is written when none exists.
    pub fn config_search_paths(&self, explicit: Option<&Path>) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(3);
        if let Some(path) = explicit {
            paths.push(path.to_path_buf());
        }
        if let Some(path) = self.game_config_path() {
            paths.push(path);
        }
        paths.push(self.user_config_path());
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> StoragePaths {
        StoragePaths::new(PathBuf::from("/docs"), Some(PathBuf::from("/game")))
    }

    #[test]
    fn layout_under_documents() {
        let p = paths();
        assert_eq!(p.data_dir(), PathBuf::from("/docs/TownOfUs"));
        assert_eq!(p.user_config_path(), PathBuf::from("/docs/TownOfUs/ApiSet.ini"));
        assert_eq!(p.backup_dir(), PathBuf::from("/docs/TownOfUs/GameLogs"));
    }

    #[test]
    fn search_order_is_explicit_game_then_user() {
        let p = paths();
        assert_eq!(
            p.config_search_paths(Some(Path::new("/custom.ini"))),
            vec![
                PathBuf::from("/custom.ini"),
                PathBuf::from("/game/ApiSet.ini"),
                PathBuf::from("/docs/TownOfUs/ApiSet.ini"),
            ]
        );
    }

    #[test]
    fn search_without_game_dir() {
        let p = StoragePaths::new(PathBuf::from("/docs"), None);
        assert_eq!(
            p.config_search_paths(None),
            vec![PathBuf::from("/docs/TownOfUs/ApiSet.ini")]
        );
    }
}
