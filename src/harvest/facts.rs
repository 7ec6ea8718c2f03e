//! harvest::facts
//!
//! Fact-getters over an initialised [`Bridge`].
//!
//! # Fault isolation
//!
//! Each getter reads its own foreign member and returns
//! `Result<_, FactUnavailable>`. One failing getter never affects another;
//! [`Harvester::harvest`] logs each failure and substitutes the empty
//! default.
//!
//! Missing fields inside an entry are not failures: they default to
//! empty, false or zero and the entry is kept.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::bridge::names::{self, kill, player, record, stats};
use crate::bridge::{
    to_entries, to_map, to_sequence, Bridge, ForeignObject, ForeignValue, MemberRef, ObjectRef,
    SessionInfo,
};
use crate::core::markup::strip_markup;
use crate::core::types::{
    KillEvent, PlayerCounters, PlayerDetails, PlayerId, RawPlayerRecord, UNKNOWN,
};

/// The facts the harvester reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fact {
    Roster,
    Counters,
    RoleTimeline,
    KillLog,
    WinningFaction,
    Modifiers,
    PlayerDetails,
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Fact::Roster => "roster",
            Fact::Counters => "counters",
            Fact::RoleTimeline => "role timeline",
            Fact::KillLog => "kill log",
            Fact::WinningFaction => "winning faction",
            Fact::Modifiers => "modifiers",
            Fact::PlayerDetails => "player details",
        };
        write!(f, "{}", name)
    }
}

/// A fact could not be read. Recovered as the fact's empty default.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{fact} unavailable: {reason}")]
pub struct FactUnavailable {
    pub fact: Fact,
    pub reason: String,
}

impl FactUnavailable {
    fn new(fact: Fact, reason: impl Into<String>) -> Self {
        Self {
            fact,
            reason: reason.into(),
        }
    }
}

/// Everything harvested for one match. Owns plain values only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarvestedMatch {
    pub session: SessionInfo,
    /// Roster in foreign order, unique by player id
    pub roster: Vec<RawPlayerRecord>,
    pub counters: BTreeMap<PlayerId, PlayerCounters>,
    /// Role names per player, oldest first
    pub role_timelines: BTreeMap<PlayerId, Vec<String>>,
    pub kill_log: Vec<KillEvent>,
    /// Empty when the foreign module has none
    pub winning_faction: String,
    pub modifiers: BTreeMap<PlayerId, Vec<String>>,
    pub details: BTreeMap<PlayerId, PlayerDetails>,
}

/// Reads match facts through a bridge.
#[derive(Debug, Clone, Copy)]
pub struct Harvester<'a> {
    bridge: &'a Bridge,
}

impl<'a> Harvester<'a> {
    pub fn new(bridge: &'a Bridge) -> Self {
        Self { bridge }
    }

    /// Run every getter and collect the results.
    pub fn harvest(&self) -> HarvestedMatch {
        let roster = recover(self.roster());
        let counters = recover(self.counters());
        let role_timelines = recover(self.role_timelines());
        let kill_log = recover(self.kill_log());
        let winning_faction = recover(self.winning_faction());

        let mut modifiers = BTreeMap::new();
        let mut details = BTreeMap::new();
        for r in &roster {
            modifiers.insert(r.player_id, recover(self.modifiers(r.player_id)));
            details.insert(r.player_id, recover(self.player_details(r.player_id)));
        }

        info!(
            players = roster.len(),
            counters = counters.len(),
            timelines = role_timelines.len(),
            kills = kill_log.len(),
            "harvest complete"
        );

        HarvestedMatch {
            session: self.bridge.runtime().session(),
            roster,
            counters,
            role_timelines,
            kill_log,
            winning_faction,
            modifiers,
            details,
        }
    }

    /// Roster entries, first entry wins per player id.
    pub fn roster(&self) -> Result<Vec<RawPlayerRecord>, FactUnavailable> {
        let value = read_static(self.bridge.handle().player_records(), Fact::Roster)?;

        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for entry in to_sequence(&value) {
            let Some(obj) = entry.as_object() else {
                debug!(kind = entry.kind(), "skipping non-object roster entry");
                continue;
            };
            let rec = read_record(&**obj);
            if !seen.insert(rec.player_id) {
                warn!(player_id = rec.player_id, "duplicate roster entry dropped");
                continue;
            }
            result.push(rec);
        }

        debug!(count = result.len(), "roster read");
        Ok(result)
    }

    /// Counters keyed by player id; last entry wins per id.
    pub fn counters(&self) -> Result<BTreeMap<PlayerId, PlayerCounters>, FactUnavailable> {
        let value = read_static(self.bridge.handle().player_stats(), Fact::Counters)?;

        Ok(to_map(&value, ForeignValue::as_player_id)
            .into_iter()
            .filter_map(|(id, v)| v.as_object().map(|obj| (id, read_counters(&**obj))))
            .collect())
    }

    /// Role names per player, in history order, ghost roles excluded.
    pub fn role_timelines(&self) -> Result<BTreeMap<PlayerId, Vec<String>>, FactUnavailable> {
        let handle = self.bridge.handle();
        let value = read_static(handle.role_history(), Fact::RoleTimeline)?;
        let accessor = handle.role_name_accessor();

        let mut result: BTreeMap<PlayerId, Vec<String>> = BTreeMap::new();
        for (key, role) in to_entries(&value) {
            let Some(id) = key.as_player_id() else {
                debug!(kind = key.kind(), "skipping role history entry with unusable key");
                continue;
            };
            let Some(role) = role.as_object() else {
                debug!(player_id = id, "skipping non-object role behaviour");
                continue;
            };
            let name = match role.invoke(accessor, &[]) {
                Ok(v) => v.as_text().map(str::to_string).unwrap_or_default(),
                Err(e) => {
                    warn!(player_id = id, error = %e, "role name accessor failed");
                    continue;
                }
            };
            if name.is_empty() {
                debug!(player_id = id, "role name accessor returned nothing");
                continue;
            }
            if name.contains(names::GHOST_MARKER) {
                debug!(player_id = id, role = %name, "skipping ghost role");
                continue;
            }
            result.entry(id).or_default().push(strip_markup(&name));
        }
        Ok(result)
    }

    /// Kill log; empty when the foreign module has none.
    pub fn kill_log(&self) -> Result<Vec<KillEvent>, FactUnavailable> {
        let Some(member) = self.bridge.handle().killed_players() else {
            return Ok(Vec::new());
        };
        let value = member
            .read()
            .map_err(|e| FactUnavailable::new(Fact::KillLog, e.to_string()))?;

        Ok(to_sequence(&value)
            .iter()
            .filter_map(|v| v.as_object())
            .map(|obj| KillEvent {
                killer_id: field_player_id(&**obj, kill::KILLER_ID),
                victim_id: field_player_id(&**obj, kill::VICTIM_ID),
            })
            .collect())
    }

    /// Winning faction text; empty when the foreign module has none.
    pub fn winning_faction(&self) -> Result<String, FactUnavailable> {
        let Some(member) = self.bridge.handle().winning_faction() else {
            return Ok(String::new());
        };
        let value = member
            .read()
            .map_err(|e| FactUnavailable::new(Fact::WinningFaction, e.to_string()))?;
        Ok(value.as_text().map(str::to_string).unwrap_or_default())
    }

    /// Modifier names held by a live player.
    ///
    /// Empty when the player, the modifier query or the modifier base type
    /// cannot be resolved.
    pub fn modifiers(&self, id: PlayerId) -> Result<Vec<String>, FactUnavailable> {
        let Some(control) = self.live_player(id, Fact::Modifiers)? else {
            return Ok(Vec::new());
        };
        if !control.has_generic_method(names::GET_MODIFIERS) {
            debug!(player_id = id, "player has no modifier query");
            return Ok(Vec::new());
        }
        let Some(base) = self.bridge.handle().modifier_base_type() else {
            debug!("modifier base type not found");
            return Ok(Vec::new());
        };

        let value = control
            .invoke_generic(names::GET_MODIFIERS, &[base], &[])
            .map_err(|e| FactUnavailable::new(Fact::Modifiers, e.to_string()))?;

        Ok(to_sequence(&value)
            .iter()
            .filter_map(|m| m.as_object())
            .filter_map(|m| text_field(&**m, names::MODIFIER_NAME))
            .map(|name| strip_markup(&name))
            .filter(|name| !name.is_empty())
            .collect())
    }

    /// Task progress, friend code and platform of a live player.
    pub fn player_details(&self, id: PlayerId) -> Result<PlayerDetails, FactUnavailable> {
        let Some(control) = self.live_player(id, Fact::PlayerDetails)? else {
            return Ok(PlayerDetails::default());
        };
        let Some(data) = control.member(player::DATA).and_then(|d| d.as_object().cloned()) else {
            return Ok(PlayerDetails::default());
        };

        let tasks = data
            .member(player::TASKS)
            .map(|t| to_sequence(&t))
            .unwrap_or_default();
        let completed = tasks
            .iter()
            .filter_map(|t| t.as_object())
            .filter(|t| {
                t.member(player::TASK_COMPLETE)
                    .and_then(|c| c.as_bool())
                    .unwrap_or(false)
            })
            .count();

        let friend_code = text_field(&*data, player::FRIEND_CODE).filter(|c| !c.is_empty());
        let platform = data
            .member(player::PLATFORM)
            .and_then(|p| p.as_display_text())
            .unwrap_or_else(|| UNKNOWN.to_string());

        Ok(PlayerDetails {
            total_tasks: u32::try_from(tasks.len()).unwrap_or(u32::MAX),
            tasks_completed: u32::try_from(completed).unwrap_or(u32::MAX),
            friend_code,
            platform,
        })
    }

    fn live_player(&self, id: PlayerId, fact: Fact) -> Result<Option<ObjectRef>, FactUnavailable> {
        let players = self
            .bridge
            .runtime()
            .live_players()
            .map_err(|e| FactUnavailable::new(fact, e.to_string()))?;

        Ok(to_sequence(&players)
            .iter()
            .filter_map(|p| p.as_object())
            .find(|p| {
                p.member(player::PLAYER_ID)
                    .and_then(|v| v.as_player_id())
                    == Some(id)
            })
            .cloned())
    }
}

fn recover<T: Default>(result: Result<T, FactUnavailable>) -> T {
    result.unwrap_or_else(|e| {
        warn!(fact = %e.fact, reason = %e.reason, "fact unavailable; using default");
        T::default()
    })
}

fn read_static(member: &MemberRef, fact: Fact) -> Result<ForeignValue, FactUnavailable> {
    let value = member
        .read()
        .map_err(|e| FactUnavailable::new(fact, e.to_string()))?;
    if value.is_null() {
        return Err(FactUnavailable::new(fact, format!("{} is null", member.name())));
    }
    Ok(value)
}

fn read_record(obj: &dyn ForeignObject) -> RawPlayerRecord {
    RawPlayerRecord {
        player_id: field_player_id(obj, record::PLAYER_ID),
        display_name: text_field(obj, record::PLAYER_NAME).unwrap_or_default(),
        is_winner: obj
            .member(record::WINNER)
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        team_label: obj
            .member(record::TEAM)
            .and_then(|v| v.as_display_text())
            .unwrap_or_else(|| UNKNOWN.to_string()),
        descriptive_string: text_field(obj, record::ROLE_STRING).unwrap_or_default(),
    }
}

fn read_counters(obj: &dyn ForeignObject) -> PlayerCounters {
    PlayerCounters {
        correct_kills: int_field(obj, stats::CORRECT_KILLS),
        incorrect_kills: int_field(obj, stats::INCORRECT_KILLS),
        correct_assassin_kills: int_field(obj, stats::CORRECT_ASSASSIN_KILLS),
        incorrect_assassin_kills: int_field(obj, stats::INCORRECT_ASSASSIN_KILLS),
    }
}

fn text_field(obj: &dyn ForeignObject, name: &str) -> Option<String> {
    obj.member(name).and_then(|v| v.as_text().map(str::to_string))
}

fn int_field(obj: &dyn ForeignObject, name: &str) -> i32 {
    obj.member(name)
        .and_then(|v| v.as_i64())
        .and_then(|i| i32::try_from(i).ok())
        .unwrap_or(0)
}

fn field_player_id(obj: &dyn ForeignObject, name: &str) -> PlayerId {
    obj.member(name).and_then(|v| v.as_player_id()).unwrap_or(0)
}
