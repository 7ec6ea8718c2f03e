//! export::backup
//!
//! Local JSON copies of export records.
//!
//! Files are named `Game_<yyyyMMdd_HHmmss>_<first 8 chars of gameId>.json`
//! using local time, and contain the same payload that is posted,
//! pretty-printed.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;
use tokio::fs;
use tracing::info;

use super::schema::ExportRecord;

/// Errors from writing a backup.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("failed to create backup directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write backup '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode backup: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File name for a record backed up at `now`.
pub fn backup_file_name(record: &ExportRecord, now: DateTime<Local>) -> String {
    let short_id: String = record.game_info.game_id.chars().take(8).collect();
    format!("Game_{}_{}.json", now.format("%Y%m%d_%H%M%S"), short_id)
}

/// Write a pretty-printed backup into `dir`, creating it if needed.
///
/// Returns the path written.
pub async fn write_backup(dir: &Path, record: &ExportRecord) -> Result<PathBuf, BackupError> {
    fs::create_dir_all(dir)
        .await
        .map_err(|source| BackupError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

    let path = dir.join(backup_file_name(record, Local::now()));
    let json = serde_json::to_string_pretty(record)?;
    fs::write(&path, json)
        .await
        .map_err(|source| BackupError::Write {
            path: path.clone(),
            source,
        })?;

    info!(path = %path.display(), "local backup saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::schema::{GameInfo, GameResult};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn record() -> ExportRecord {
        ExportRecord {
            token: "tok".into(),
            secret: Some("shh".into()),
            game_info: GameInfo {
                game_id: "1234abcd-ffff-4000-8000-000000000000".into(),
                timestamp: Utc::now(),
                lobby_code: "QWERTY".into(),
                game_mode: "Normal".into(),
                duration: 61.0,
                map: "MIRA HQ".into(),
            },
            players: vec![],
            game_result: GameResult {
                winning_team: "Impostors".into(),
            },
        }
    }

    #[test]
    fn file_name_uses_local_time_and_short_id() {
        let now = Local.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            backup_file_name(&record(), now),
            "Game_20250309_140507_1234abcd.json"
        );
    }

    #[test]
    fn short_game_id_is_used_whole() {
        let mut r = record();
        r.game_info.game_id = "abc".into();
        let now = Local.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(backup_file_name(&r, now), "Game_20250101_000000_abc.json");
    }

    #[tokio::test]
    async fn writes_pretty_json_into_new_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("TownOfUs").join("GameLogs");

        let path = write_backup(&dir, &record()).await.unwrap();
        assert!(path.starts_with(&dir));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'));
        let back: ExportRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(back, record_with_time(back.game_info.timestamp));
    }

    fn record_with_time(timestamp: DateTime<Utc>) -> ExportRecord {
        let mut r = record();
        r.game_info.timestamp = timestamp;
        r
    }

    #[tokio::test]
    async fn unwritable_directory_is_an_error() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let err = write_backup(&blocker.join("sub"), &record()).await.unwrap_err();
        assert!(matches!(err, BackupError::CreateDir { .. }));
    }
}
