//! export::schema
//!
//! Wire payload sent to the stats collector and written to backups.
//!
//! Keys are camelCase. Optional values that are absent are omitted from
//! the JSON rather than written as `null`.
//!
//! ```json
//! {
//!   "token": "...",
//!   "gameInfo": { "gameId": "...", "timestamp": "...", "lobbyCode": "ABCDEF",
//!                 "gameMode": "Normal", "duration": 300.0, "map": "Polus" },
//!   "players": [ { "playerId": 0, "playerName": "Red", "platform": "Unknown",
//!                  "role": "Impostor", "roles": ["Impostor"], "modifiers": [],
//!                  "isWinner": true, "stats": { "totalTasks": 0, ... } } ],
//!   "gameResult": { "winningTeam": "Impostors" }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::PlayerId;

/// The complete export for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    pub game_info: GameInfo,
    pub players: Vec<PlayerExport>,
    pub game_result: GameResult,
}

/// Match-level information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    /// Random identifier generated per export
    pub game_id: String,
    pub timestamp: DateTime<Utc>,
    pub lobby_code: String,
    pub game_mode: String,
    /// Seconds
    pub duration: f32,
    /// Map display name
    pub map: String,
}

/// One player's exported record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerExport {
    pub player_id: PlayerId,
    pub player_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_tag: Option<String>,
    pub platform: String,
    /// Final role
    pub role: String,
    pub roles: Vec<String>,
    pub modifiers: Vec<String>,
    pub is_winner: bool,
    pub stats: PlayerStats,
}

/// One player's numeric statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub total_tasks: u32,
    pub tasks_completed: u32,
    pub kills: u32,
    pub correct_kills: i32,
    pub incorrect_kills: i32,
    pub correct_assassin_kills: i32,
    pub incorrect_assassin_kills: i32,
}

/// Match outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub winning_team: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> ExportRecord {
        ExportRecord {
            token: "tok".into(),
            secret: None,
            game_info: GameInfo {
                game_id: "0f8fad5b-d9cb-469f-a165-70867728950e".into(),
                timestamp: DateTime::parse_from_rfc3339("2025-01-02T03:04:05Z")
                    .unwrap()
                    .with_timezone(&Utc),
                lobby_code: "ABCDEF".into(),
                game_mode: "Normal".into(),
                duration: 120.5,
                map: "Polus".into(),
            },
            players: vec![PlayerExport {
                player_id: 3,
                player_name: "Cyan".into(),
                player_tag: None,
                platform: "Unknown".into(),
                role: "Sheriff".into(),
                roles: vec!["Sheriff".into()],
                modifiers: vec![],
                is_winner: false,
                stats: PlayerStats {
                    kills: 1,
                    ..Default::default()
                },
            }],
            game_result: GameResult {
                winning_team: "Crewmates".into(),
            },
        }
    }

    #[test]
    fn serializes_camel_case_and_omits_absent_optionals() {
        let value = serde_json::to_value(record()).unwrap();
        assert_eq!(
            value,
            json!({
                "token": "tok",
                "gameInfo": {
                    "gameId": "0f8fad5b-d9cb-469f-a165-70867728950e",
                    "timestamp": "2025-01-02T03:04:05Z",
                    "lobbyCode": "ABCDEF",
                    "gameMode": "Normal",
                    "duration": 120.5,
                    "map": "Polus"
                },
                "players": [{
                    "playerId": 3,
                    "playerName": "Cyan",
                    "platform": "Unknown",
                    "role": "Sheriff",
                    "roles": ["Sheriff"],
                    "modifiers": [],
                    "isWinner": false,
                    "stats": {
                        "totalTasks": 0,
                        "tasksCompleted": 0,
                        "kills": 1,
                        "correctKills": 0,
                        "incorrectKills": 0,
                        "correctAssassinKills": 0,
                        "incorrectAssassinKills": 0
                    }
                }],
                "gameResult": { "winningTeam": "Crewmates" }
            })
        );
    }

    #[test]
    fn present_optionals_are_written() {
        let mut r = record();
        r.secret = Some("s".into());
        r.players[0].player_tag = Some("tag#1".into());
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["secret"], "s");
        assert_eq!(value["players"][0]["playerTag"], "tag#1");
    }
}
