//! export::transform
//!
//! Normalizes harvested facts into an [`ExportRecord`].
//!
//! # Per player, in roster order
//!
//! - roles: the harvested timeline, else the descriptive-string fallback
//! - role: the last role, else `Unknown`
//! - modifiers: the harvested list, else the descriptive-string fallback
//! - kills: kill-log entries by this player, self-kills excluded
//! - counters: sign corrected
//! - name: markup stripped
//!
//! Facts keyed by a player id that is not in the roster are ignored.
//!
//! Normalization is pure; the game id and timestamp are supplied by the
//! caller through [`GameInfo`].

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::schema::{ExportRecord, GameInfo, GameResult, PlayerExport, PlayerStats};
use crate::bridge::SessionInfo;
use crate::core::config::Credentials;
use crate::core::markup::strip_markup;
use crate::core::types::{KillEvent, PlayerId, RawPlayerRecord, UNKNOWN};
use crate::harvest::fallback::{self, FallbackParse};
use crate::harvest::HarvestedMatch;

/// Map names by map id.
pub const MAP_NAMES: [&str; 6] = [
    "The Skeld",
    "MIRA HQ",
    "Polus",
    "Airship",
    "The Fungle",
    "Submerged",
];

/// Display name of a map id.
pub fn map_name(map_id: u8) -> String {
    MAP_NAMES
        .get(usize::from(map_id))
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("Unknown Map ({})", map_id))
}

/// Winning side named by a team label.
pub fn team_winning_side(team_label: &str) -> &'static str {
    match team_label {
        "Crewmate" => "Crewmates",
        "Impostor" => "Impostors",
        "Neutral" => "Neutrals",
        "Custom" => "Custom",
        _ => UNKNOWN,
    }
}

/// Resolve the winning team.
///
/// A non-empty faction string is used verbatim. Otherwise the first
/// winner's team label is mapped; with no winner the result is `Unknown`.
pub fn winning_team(winning_faction: &str, roster: &[RawPlayerRecord]) -> String {
    if !winning_faction.is_empty() {
        return winning_faction.to_string();
    }
    roster
        .iter()
        .find(|r| r.is_winner)
        .map(|r| team_winning_side(&r.team_label))
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Kills by a player, self-kills excluded.
pub fn kill_count(player_id: PlayerId, kill_log: &[KillEvent]) -> u32 {
    let count = kill_log
        .iter()
        .filter(|k| k.killer_id == player_id && !k.is_self_kill())
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Match information with a fresh game id and the current time.
pub fn game_info(session: &SessionInfo) -> GameInfo {
    GameInfo {
        game_id: Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
        lobby_code: session.lobby_code.clone(),
        game_mode: session.game_mode.clone(),
        duration: session.duration_secs,
        map: map_name(session.map_id),
    }
}

/// Build the export record for a harvested match.
pub fn normalize(
    harvested: &HarvestedMatch,
    game_info: GameInfo,
    credentials: &Credentials,
) -> ExportRecord {
    let players: Vec<PlayerExport> = harvested
        .roster
        .iter()
        .map(|r| normalize_player(r, harvested))
        .collect();

    let winning_team = winning_team(&harvested.winning_faction, &harvested.roster);
    info!(
        players = players.len(),
        winning_team = %winning_team,
        "match normalized"
    );

    ExportRecord {
        token: credentials.token.clone(),
        secret: credentials.secret.clone(),
        game_info,
        players,
        game_result: GameResult { winning_team },
    }
}

/// Build one player's record.
pub fn normalize_player(record: &RawPlayerRecord, harvested: &HarvestedMatch) -> PlayerExport {
    let id = record.player_id;
    let mut parsed: Option<FallbackParse> = None;
    let mut fallback = || -> FallbackParse {
        parsed
            .get_or_insert_with(|| {
                debug!(player_id = id, "parsing descriptive string");
                fallback::parse(&record.descriptive_string)
            })
            .clone()
    };
    let has_descriptive = !record.descriptive_string.is_empty();

    let roles = match harvested.role_timelines.get(&id) {
        Some(timeline) if !timeline.is_empty() => timeline.clone(),
        _ if has_descriptive => fallback().roles,
        _ => Vec::new(),
    };

    let role = match roles.last() {
        Some(role) => role.clone(),
        None => {
            if has_descriptive {
                if let Err(e) = fallback().role() {
                    debug!(player_id = id, error = %e, "role unknown");
                }
            }
            UNKNOWN.to_string()
        }
    };

    let modifiers = match harvested.modifiers.get(&id) {
        Some(mods) if !mods.is_empty() => mods.clone(),
        _ if has_descriptive => fallback().modifiers,
        _ => Vec::new(),
    };

    let counters = harvested
        .counters
        .get(&id)
        .copied()
        .unwrap_or_default()
        .sign_corrected();
    let details = harvested.details.get(&id).cloned().unwrap_or_default();

    PlayerExport {
        player_id: id,
        player_name: strip_markup(&record.display_name),
        player_tag: details.friend_code,
        platform: details.platform,
        role,
        roles,
        modifiers,
        is_winner: record.is_winner,
        stats: PlayerStats {
            total_tasks: details.total_tasks,
            tasks_completed: details.tasks_completed,
            kills: kill_count(id, &harvested.kill_log),
            correct_kills: counters.correct_kills,
            incorrect_kills: counters.incorrect_kills,
            correct_assassin_kills: counters.correct_assassin_kills,
            incorrect_assassin_kills: counters.incorrect_assassin_kills,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{PlayerCounters, PlayerDetails};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn player(id: PlayerId) -> RawPlayerRecord {
        RawPlayerRecord {
            player_id: id,
            display_name: format!("P{}", id),
            ..Default::default()
        }
    }

    fn info() -> GameInfo {
        game_info(&SessionInfo::default())
    }

    fn creds() -> Credentials {
        Credentials {
            token: "tok".into(),
            secret: Some("sec".into()),
        }
    }

    #[test]
    fn map_names() {
        assert_eq!(map_name(0), "The Skeld");
        assert_eq!(map_name(5), "Submerged");
        assert_eq!(map_name(9), "Unknown Map (9)");
    }

    #[test]
    fn winning_team_prefers_faction() {
        let roster = vec![RawPlayerRecord {
            is_winner: true,
            team_label: "Impostor".into(),
            ..player(0)
        }];
        assert_eq!(winning_team("Lovers", &roster), "Lovers");
        assert_eq!(winning_team("", &roster), "Impostors");
    }

    #[test]
    fn winning_team_uses_first_winner_and_table() {
        let roster = vec![
            RawPlayerRecord {
                team_label: "Impostor".into(),
                ..player(0)
            },
            RawPlayerRecord {
                is_winner: true,
                team_label: "Neutral".into(),
                ..player(1)
            },
            RawPlayerRecord {
                is_winner: true,
                team_label: "Crewmate".into(),
                ..player(2)
            },
        ];
        assert_eq!(winning_team("", &roster), "Neutrals");
        assert_eq!(team_winning_side("Custom"), "Custom");
        assert_eq!(team_winning_side("Lovers"), "Unknown");
        assert_eq!(winning_team("", &[player(0)]), "Unknown");
    }

    #[test]
    fn kill_count_excludes_self_kills() {
        let kills = vec![
            KillEvent { killer_id: 1, victim_id: 2 },
            KillEvent { killer_id: 1, victim_id: 1 },
            KillEvent { killer_id: 2, victim_id: 1 },
            KillEvent { killer_id: 1, victim_id: 3 },
        ];
        assert_eq!(kill_count(1, &kills), 2);
        assert_eq!(kill_count(2, &kills), 1);
        assert_eq!(kill_count(3, &kills), 0);
    }

    #[test]
    fn harvested_timeline_wins_over_descriptive_string() {
        let harvested = HarvestedMatch {
            roster: vec![RawPlayerRecord {
                descriptive_string: "Jester (Giant)".into(),
                ..player(0)
            }],
            role_timelines: BTreeMap::from([(0, vec!["Amnesiac".into(), "Sheriff".into()])]),
            modifiers: BTreeMap::from([(0, vec!["Flash".into()])]),
            ..Default::default()
        };
        let p = normalize_player(&harvested.roster[0], &harvested);
        assert_eq!(p.roles, vec!["Amnesiac", "Sheriff"]);
        assert_eq!(p.role, "Sheriff");
        assert_eq!(p.modifiers, vec!["Flash"]);
    }

    #[test]
    fn fallback_fills_roles_and_modifiers_independently() {
        let harvested = HarvestedMatch {
            roster: vec![RawPlayerRecord {
                descriptive_string: "Jester (Giant)".into(),
                ..player(0)
            }],
            role_timelines: BTreeMap::from([(0, vec!["Jester".into()])]),
            ..Default::default()
        };
        let p = normalize_player(&harvested.roster[0], &harvested);
        assert_eq!(p.roles, vec!["Jester"]);
        assert_eq!(p.modifiers, vec!["Giant"]);
    }

    #[test]
    fn no_roles_anywhere_is_unknown() {
        let harvested = HarvestedMatch {
            roster: vec![player(0), RawPlayerRecord {
                descriptive_string: " > ".into(),
                ..player(1)
            }],
            ..Default::default()
        };
        for r in &harvested.roster {
            let p = normalize_player(r, &harvested);
            assert_eq!(p.role, "Unknown");
            assert!(p.roles.is_empty());
            assert!(p.modifiers.is_empty());
        }
    }

    #[test]
    fn details_and_counters_are_applied() {
        let harvested = HarvestedMatch {
            roster: vec![player(5)],
            counters: BTreeMap::from([(
                5,
                PlayerCounters {
                    correct_kills: 1,
                    incorrect_kills: 0,
                    correct_assassin_kills: -2,
                    incorrect_assassin_kills: 1,
                },
            )]),
            details: BTreeMap::from([(
                5,
                PlayerDetails {
                    total_tasks: 4,
                    tasks_completed: 3,
                    friend_code: Some("x#1".into()),
                    platform: "Android".into(),
                },
            )]),
            ..Default::default()
        };
        let p = normalize_player(&harvested.roster[0], &harvested);
        assert_eq!(p.stats.correct_assassin_kills, 0);
        assert_eq!(p.stats.incorrect_assassin_kills, 3);
        assert_eq!(p.stats.correct_kills, 1);
        assert_eq!(p.stats.total_tasks, 4);
        assert_eq!(p.stats.tasks_completed, 3);
        assert_eq!(p.player_tag.as_deref(), Some("x#1"));
        assert_eq!(p.platform, "Android");
    }

    #[test]
    fn normalize_carries_credentials_and_info() {
        let harvested = HarvestedMatch {
            roster: vec![player(0)],
            winning_faction: "Crewmates".into(),
            ..Default::default()
        };
        let info = info();
        let record = normalize(&harvested, info.clone(), &creds());
        assert_eq!(record.token, "tok");
        assert_eq!(record.secret.as_deref(), Some("sec"));
        assert_eq!(record.game_info, info);
        assert_eq!(record.game_result.winning_team, "Crewmates");
    }

    #[test]
    fn game_info_from_session() {
        let session = SessionInfo {
            lobby_code: "ZZZZZZ".into(),
            game_mode: "Normal".into(),
            map_id: 3,
            duration_secs: 42.0,
        };
        let info = game_info(&session);
        assert_eq!(info.map, "Airship");
        assert_eq!(info.lobby_code, "ZZZZZZ");
        assert_eq!(info.duration, 42.0);
        assert!(Uuid::parse_str(&info.game_id).is_ok());
        assert_ne!(game_info(&session).game_id, info.game_id);
    }

    proptest! {
        #[test]
        fn export_ids_match_roster(
            ids in prop::collection::btree_set(any::<u8>(), 0..20),
            orphans in prop::collection::vec(any::<u8>(), 0..10),
        ) {
            let roster: Vec<RawPlayerRecord> = ids.iter().map(|id| player(*id)).collect();
            let mut counters = BTreeMap::new();
            for o in &orphans {
                counters.insert(*o, PlayerCounters::default());
            }
            let harvested = HarvestedMatch { roster, counters, ..Default::default() };

            let record = normalize(&harvested, info(), &creds());
            let exported: Vec<PlayerId> = record.players.iter().map(|p| p.player_id).collect();
            let expected: Vec<PlayerId> = ids.iter().copied().collect();
            prop_assert_eq!(exported, expected);
        }

        #[test]
        fn faction_is_used_verbatim(faction in "[A-Za-z ]{1,20}", winner in any::<bool>()) {
            let roster = vec![RawPlayerRecord { is_winner: winner, team_label: "Impostor".into(), ..player(0) }];
            prop_assert_eq!(winning_team(&faction, &roster), faction);
        }

        #[test]
        fn self_kills_never_count(id in any::<u8>(), n in 0usize..10) {
            let kills = vec![KillEvent { killer_id: id, victim_id: id }; n];
            prop_assert_eq!(kill_count(id, &kills), 0);
        }
    }
}
