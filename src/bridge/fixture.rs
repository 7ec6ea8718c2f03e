//! bridge::fixture
//!
//! Builds an in-memory host laid out the way the foreign module lays out
//! its end-of-match state.
//!
//! # Layout
//!
//! - `TownOfUs.Patches.EndGamePatches` / `EndGameData` / `PlayerRecord`
//!   with the roster in `EndGameData.PlayerRecords` (an indexed list)
//! - `TownOfUs.Modules.GameHistory` with `PlayerStats` (dictionary),
//!   `RoleHistory` (list of key/value pairs), `KilledPlayers` (list) and
//!   `WinningFaction` (text)
//! - `MiraAPI.Modifiers.GameModifier` as the modifier base type
//! - one live player object per roster entry
//!
//! Any named piece can be left out with [`MatchFixture::without`] or made
//! to fail on read with [`MatchFixture::faulting`].
//!
//! # Example
//!
//! ```
//! use tou_stats_exporter::bridge::fixture::{FixturePlayer, MatchFixture};
//! use tou_stats_exporter::bridge::locate;
//!
//! let runtime = MatchFixture::new()
//!     .player(FixturePlayer::new(0, "Red").winner().team("Impostor"))
//!     .role(0, "Impostor")
//!     .build();
//!
//! assert!(locate(&runtime).is_ok());
//! ```

use std::collections::{BTreeMap, HashSet};

use super::memory::{MemoryModule, MemoryObject, MemoryRuntime, MemoryType};
use super::names::{self, kill, player, record, stats};
use super::traits::{ForeignValue, SessionInfo};

/// Enum type name of roster team labels.
const TEAM_ENUM: &str = "ModdedRoleTeams";

/// Enum type name of player platforms.
const PLATFORM_ENUM: &str = "Platforms";

/// One roster entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FixturePlayer {
    pub id: u8,
    pub name: String,
    pub winner: bool,
    pub team: String,
    pub role_string: String,
}

impl FixturePlayer {
    pub fn new(id: u8, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            winner: false,
            team: "Crewmate".to_string(),
            role_string: String::new(),
        }
    }

    pub fn winner(mut self) -> Self {
        self.winner = true;
        self
    }

    pub fn team(mut self, team: impl Into<String>) -> Self {
        self.team = team.into();
        self
    }

    pub fn role_string(mut self, role_string: impl Into<String>) -> Self {
        self.role_string = role_string.into();
        self
    }
}

/// Per-player live state.
#[derive(Debug, Clone, Default)]
struct LiveState {
    modifiers: Vec<String>,
    tasks: Vec<bool>,
    friend_code: Option<String>,
    platform: Option<String>,
}

/// Builder for a [`MemoryRuntime`] holding one finished match.
#[derive(Debug, Clone)]
pub struct MatchFixture {
    module_name: String,
    version: Option<String>,
    players: Vec<FixturePlayer>,
    counters: Vec<(ForeignValue, [i64; 4])>,
    role_history: Vec<(u8, String)>,
    kills: Vec<(u8, u8)>,
    winning_faction: String,
    live: BTreeMap<u8, LiveState>,
    offline: HashSet<u8>,
    session: SessionInfo,
    omitted: HashSet<String>,
    faulting: HashSet<String>,
    unreadable_records: HashSet<usize>,
}

impl Default for MatchFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchFixture {
    pub fn new() -> Self {
        Self {
            module_name: "TownOfUsMira".to_string(),
            version: Some("1.2.1".to_string()),
            players: Vec::new(),
            counters: Vec::new(),
            role_history: Vec::new(),
            kills: Vec::new(),
            winning_faction: String::new(),
            live: BTreeMap::new(),
            offline: HashSet::new(),
            session: SessionInfo {
                lobby_code: "ABCDEF".to_string(),
                game_mode: "Normal".to_string(),
                map_id: 0,
                duration_secs: 300.0,
            },
            omitted: HashSet::new(),
            faulting: HashSet::new(),
            unreadable_records: HashSet::new(),
        }
    }

    pub fn module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    pub fn version(mut self, version: Option<&str>) -> Self {
        self.version = version.map(str::to_string);
        self
    }

    pub fn player(mut self, player: FixturePlayer) -> Self {
        self.players.push(player);
        self
    }

    /// Set counters in field order: correct, incorrect, correct assassin,
    /// incorrect assassin.
    pub fn counters(mut self, id: u8, values: [i64; 4]) -> Self {
        self.counters.push((ForeignValue::from(id), values));
        self
    }

    /// Add a counters entry under an arbitrary key.
    pub fn counters_with_key(mut self, key: ForeignValue, values: [i64; 4]) -> Self {
        self.counters.push((key, values));
        self
    }

    /// Append a role to a player's history.
    pub fn role(mut self, id: u8, name: impl Into<String>) -> Self {
        self.role_history.push((id, name.into()));
        self
    }

    pub fn kill(mut self, killer: u8, victim: u8) -> Self {
        self.kills.push((killer, victim));
        self
    }

    pub fn winning_faction(mut self, faction: impl Into<String>) -> Self {
        self.winning_faction = faction.into();
        self
    }

    pub fn modifiers(mut self, id: u8, modifiers: &[&str]) -> Self {
        self.live.entry(id).or_default().modifiers = modifiers.iter().map(|m| m.to_string()).collect();
        self
    }

    /// Give a player `total` tasks, the first `done` of them complete.
    pub fn tasks(mut self, id: u8, total: usize, done: usize) -> Self {
        self.live.entry(id).or_default().tasks = (0..total).map(|i| i < done).collect();
        self
    }

    pub fn friend_code(mut self, id: u8, code: impl Into<String>) -> Self {
        self.live.entry(id).or_default().friend_code = Some(code.into());
        self
    }

    pub fn platform(mut self, id: u8, platform: impl Into<String>) -> Self {
        self.live.entry(id).or_default().platform = Some(platform.into());
        self
    }

    /// Leave a roster player without a live player object.
    pub fn offline(mut self, id: u8) -> Self {
        self.offline.insert(id);
        self
    }

    pub fn session(mut self, session: SessionInfo) -> Self {
        self.session = session;
        self
    }

    /// Omit a type, static member or method by its simple name.
    pub fn without(mut self, name: &str) -> Self {
        self.omitted.insert(name.to_string());
        self
    }

    /// Make a static member or method fail when read or invoked.
    pub fn faulting(mut self, name: &str) -> Self {
        self.faulting.insert(name.to_string());
        self
    }

    /// Make reading the roster entry at `index` (insertion order) fail.
    pub fn unreadable_record(mut self, index: usize) -> Self {
        self.unreadable_records.insert(index);
        self
    }

    fn omits(&self, name: &str) -> bool {
        self.omitted.contains(name)
    }

    fn roster(&self) -> ForeignValue {
        let records = self
            .players
            .iter()
            .map(|p| {
                MemoryObject::new("PlayerRecord")
                    .with_member(record::PLAYER_ID, p.id)
                    .with_member(record::PLAYER_NAME, p.name.as_str())
                    .with_member(record::WINNER, p.winner)
                    .with_enum_member(record::TEAM, TEAM_ENUM, p.team.as_str())
                    .with_member(record::ROLE_STRING, p.role_string.as_str())
                    .into_value()
            })
            .collect();
        self.unreadable_records
            .iter()
            .fold(MemoryObject::indexed(records), |list, &i| {
                list.with_faulting_index(i)
            })
            .into_value()
    }

    fn player_stats(&self) -> ForeignValue {
        let entries = self
            .counters
            .iter()
            .map(|(key, [c, i, ca, ia])| {
                let value = MemoryObject::new("PlayerStats")
                    .with_member(stats::CORRECT_KILLS, *c)
                    .with_member(stats::INCORRECT_KILLS, *i)
                    .with_member(stats::CORRECT_ASSASSIN_KILLS, *ca)
                    .with_member(stats::INCORRECT_ASSASSIN_KILLS, *ia)
                    .into_value();
                (key.clone(), value)
            })
            .collect();
        MemoryObject::dictionary(entries).into_value()
    }

    fn role_history(&self) -> ForeignValue {
        let entries = self
            .role_history
            .iter()
            .map(|(id, name)| {
                let mut role = MemoryObject::new("RoleBehaviour").with_method(names::GET_ROLE_NAME, name.as_str());
                if self.faulting.contains(names::GET_ROLE_NAME) {
                    role = role.with_fault(names::GET_ROLE_NAME);
                }
                (ForeignValue::from(*id), role.into_value())
            })
            .collect();
        MemoryObject::pairs(entries).into_value()
    }

    fn killed_players(&self) -> ForeignValue {
        let events = self
            .kills
            .iter()
            .map(|(killer, victim)| {
                MemoryObject::new("KillEvent")
                    .with_member(kill::KILLER_ID, *killer)
                    .with_member(kill::VICTIM_ID, *victim)
                    .into_value()
            })
            .collect();
        MemoryObject::list(events).into_value()
    }

    fn live_player(&self, id: u8) -> ForeignValue {
        let state = self.live.get(&id).cloned().unwrap_or_default();

        let tasks = state
            .tasks
            .iter()
            .map(|done| {
                MemoryObject::new("TaskInfo")
                    .with_member(player::TASK_COMPLETE, *done)
                    .into_value()
            })
            .collect();

        let mut data = MemoryObject::new("NetworkedPlayerInfo")
            .with_member(player::TASKS, MemoryObject::indexed(tasks).into_value());
        if let Some(code) = &state.friend_code {
            data = data.with_member(player::FRIEND_CODE, code.as_str());
        }
        if let Some(platform) = &state.platform {
            data = data.with_enum_member(player::PLATFORM, PLATFORM_ENUM, platform.as_str());
        }

        let modifiers = state
            .modifiers
            .iter()
            .map(|m| {
                MemoryObject::new("GameModifier")
                    .with_member(names::MODIFIER_NAME, m.as_str())
                    .into_value()
            })
            .collect();

        let mut control = MemoryObject::new("PlayerControl")
            .with_member(player::PLAYER_ID, id)
            .with_member(player::DATA, data.into_value());
        if !self.omits(names::GET_MODIFIERS) {
            control = control.with_generic_method(
                names::GET_MODIFIERS,
                names::MODIFIER_BASE,
                MemoryObject::list(modifiers).into_value(),
            );
        }
        if self.faulting.contains(names::GET_MODIFIERS) {
            control = control.with_fault(names::GET_MODIFIERS);
        }
        control.into_value()
    }

    fn with_static(&self, ty: MemoryType, name: &str, value: ForeignValue) -> MemoryType {
        if self.omits(name) {
            ty
        } else if self.faulting.contains(name) {
            ty.with_faulting_static(name)
        } else {
            ty.with_static(name, value)
        }
    }

    /// Assemble the runtime.
    pub fn build(self) -> MemoryRuntime {
        let mut end_game_data = self.with_static(
            MemoryType::new("TownOfUs.Patches.EndGamePatches+EndGameData"),
            names::PLAYER_RECORDS,
            self.roster(),
        );
        if !self.omits(names::PLAYER_RECORD) {
            end_game_data = end_game_data.with_nested(
                names::PLAYER_RECORD,
                MemoryType::new("TownOfUs.Patches.EndGamePatches+EndGameData+PlayerRecord"),
            );
        }

        let mut patches = MemoryType::new(names::END_GAME_PATCHES);
        if !self.omits(names::END_GAME_DATA) {
            patches = patches.with_nested(names::END_GAME_DATA, end_game_data);
        }

        let history = MemoryType::new(names::GAME_HISTORY);
        let history = self.with_static(history, names::PLAYER_STATS, self.player_stats());
        let history = self.with_static(history, names::ROLE_HISTORY, self.role_history());
        let history = self.with_static(history, names::KILLED_PLAYERS, self.killed_players());
        let history = self.with_static(
            history,
            names::WINNING_FACTION,
            ForeignValue::from(self.winning_faction.as_str()),
        );

        let mut module = MemoryModule::new(self.module_name.as_str(), self.version.as_deref())
            .with_type(history);
        if !self.omits(names::END_GAME_PATCHES) {
            module = module.with_type(patches);
        }
        if !self.omits(names::MODIFIER_BASE) {
            module = module.with_type(MemoryType::new(names::MODIFIER_BASE));
        }

        let mut runtime = MemoryRuntime::new()
            .with_module(MemoryModule::new("MiraAPI", Some("0.2.0")))
            .with_module(module)
            .with_session(self.session.clone());

        let mut seen = HashSet::new();
        for p in &self.players {
            if self.offline.contains(&p.id) || !seen.insert(p.id) {
                continue;
            }
            runtime = runtime.with_live_player(self.live_player(p.id));
        }
        runtime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::adapter::to_sequence;
    use crate::bridge::traits::ForeignRuntime;

    #[test]
    fn fixture_exposes_roster_and_live_players() {
        let runtime = MatchFixture::new()
            .player(FixturePlayer::new(1, "Blue"))
            .player(FixturePlayer::new(2, "Green"))
            .offline(2)
            .build();

        let module = runtime
            .modules()
            .into_iter()
            .find(|m| m.name() == "TownOfUsMira")
            .unwrap();
        let roster = module
            .find_type(names::END_GAME_PATCHES)
            .and_then(|t| t.nested_type(names::END_GAME_DATA))
            .and_then(|t| t.static_member(names::PLAYER_RECORDS))
            .unwrap()
            .read()
            .unwrap();
        assert_eq!(to_sequence(&roster).len(), 2);

        let live = runtime.live_players().unwrap();
        assert_eq!(to_sequence(&live).len(), 1);
    }

    #[test]
    fn omitted_static_is_absent() {
        let runtime = MatchFixture::new().without(names::PLAYER_STATS).build();
        let module = runtime
            .modules()
            .into_iter()
            .find(|m| m.name() == "TownOfUsMira")
            .unwrap();
        let history = module.find_type(names::GAME_HISTORY).unwrap();
        assert!(history.static_member(names::PLAYER_STATS).is_none());
        assert!(history.static_member(names::ROLE_HISTORY).is_some());
    }
}
