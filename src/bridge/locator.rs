//! bridge::locator
//!
//! Finds the foreign module and resolves the members the harvester reads.
//!
//! # Resolution
//!
//! 1. Scan loaded modules for the first candidate name (exact or substring
//!    match, candidates tried in order).
//! 2. Resolve the end-of-match types and their static members by name.
//! 3. Fail closed if any required member is missing. The kill log and the
//!    winning faction are optional.
//!
//! Resolution runs once, when the bridge is initialised; the resulting
//! [`MetadataHandle`] is immutable and shared by every later match.

use std::fmt;

use thiserror::Error;
use tracing::{error, info, warn};

use super::names;
use super::traits::{ForeignRuntime, MemberRef, ModuleRef, TypeRef};

/// Errors from locating the foreign module. Both are fatal to the bridge.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocateError {
    /// No loaded module matched any candidate name.
    #[error("foreign module not found (similar modules: [{}])", .similar.join(", "))]
    ModuleNotFound {
        /// Loaded modules whose names contain a diagnostic hint
        similar: Vec<String>,
    },

    /// A required type or member could not be resolved.
    #[error("metadata incomplete: {0} not found")]
    MetadataIncomplete(String),
}

/// Resolved references into the foreign module.
///
/// A handle only exists if every required reference resolved, so holding
/// one is proof that harvesting may be attempted.
#[derive(Clone)]
pub struct MetadataHandle {
    module: ModuleRef,
    player_record_type: TypeRef,
    player_records: MemberRef,
    player_stats: MemberRef,
    role_history: MemberRef,
    killed_players: Option<MemberRef>,
    winning_faction: Option<MemberRef>,
    role_name_accessor: &'static str,
}

impl fmt::Debug for MetadataHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataHandle")
            .field("module", &self.module.name())
            .field("version", &self.module.version())
            .field("player_record_type", &self.player_record_type.full_name())
            .field("has_killed_players", &self.killed_players.is_some())
            .field("has_winning_faction", &self.winning_faction.is_some())
            .finish()
    }
}

impl MetadataHandle {
    pub fn module(&self) -> &ModuleRef {
        &self.module
    }

    pub fn module_name(&self) -> &str {
        self.module.name()
    }

    pub fn module_version(&self) -> Option<String> {
        self.module.version()
    }

    pub fn player_record_type(&self) -> &TypeRef {
        &self.player_record_type
    }

    /// Roster member (`EndGameData.PlayerRecords`).
    pub fn player_records(&self) -> &MemberRef {
        &self.player_records
    }

    /// Counters map member (`GameHistory.PlayerStats`).
    pub fn player_stats(&self) -> &MemberRef {
        &self.player_stats
    }

    /// Role history member (`GameHistory.RoleHistory`).
    pub fn role_history(&self) -> &MemberRef {
        &self.role_history
    }

    /// Kill log member, if this module version has one.
    pub fn killed_players(&self) -> Option<&MemberRef> {
        self.killed_players.as_ref()
    }

    /// Winning faction member, if this module version has one.
    pub fn winning_faction(&self) -> Option<&MemberRef> {
        self.winning_faction.as_ref()
    }

    /// Method name invoked on role behaviours to get the display name.
    pub fn role_name_accessor(&self) -> &str {
        self.role_name_accessor
    }

    /// Resolve the modifier base type used to close the modifier query.
    pub fn modifier_base_type(&self) -> Option<TypeRef> {
        self.module.find_type(names::MODIFIER_BASE)
    }
}

/// Find the first loaded module matching a candidate name.
///
/// Candidates are tried in order; for each, the first module whose name
/// equals or contains the candidate wins.
pub fn find_module(runtime: &dyn ForeignRuntime, candidates: &[&str]) -> Option<ModuleRef> {
    let modules = runtime.modules();
    candidates.iter().find_map(|candidate| {
        modules
            .iter()
            .find(|m| m.name() == *candidate || m.name().contains(candidate))
            .cloned()
    })
}

/// Names of loaded modules containing any of the diagnostic hints.
fn similar_modules(runtime: &dyn ForeignRuntime) -> Vec<String> {
    runtime
        .modules()
        .iter()
        .map(|m| m.name().to_string())
        .filter(|n| names::MODULE_HINTS.iter().any(|h| n.contains(h)))
        .collect()
}

/// Locate the foreign module and resolve all metadata.
pub fn locate(runtime: &dyn ForeignRuntime) -> Result<MetadataHandle, LocateError> {
    let Some(module) = find_module(runtime, &names::MODULE_CANDIDATES) else {
        let similar = similar_modules(runtime);
        error!(similar = ?similar, "foreign module not found");
        return Err(LocateError::ModuleNotFound { similar });
    };

    info!(
        module = module.name(),
        version = module.version().as_deref().unwrap_or("unknown"),
        "found foreign module"
    );

    let handle = resolve(module)?;
    info!("all required foreign metadata resolved");
    Ok(handle)
}

fn resolve(module: ModuleRef) -> Result<MetadataHandle, LocateError> {
    let patches = required_type(module.find_type(names::END_GAME_PATCHES), names::END_GAME_PATCHES)?;
    let end_game_data = required_type(
        patches.nested_type(names::END_GAME_DATA),
        names::END_GAME_DATA,
    )?;
    let player_record_type = required_type(
        end_game_data.nested_type(names::PLAYER_RECORD),
        names::PLAYER_RECORD,
    )?;
    let player_records = required_member(&end_game_data, names::PLAYER_RECORDS)?;

    let game_history = required_type(module.find_type(names::GAME_HISTORY), names::GAME_HISTORY)?;
    let player_stats = required_member(&game_history, names::PLAYER_STATS)?;
    let role_history = required_member(&game_history, names::ROLE_HISTORY)?;

    let killed_players = game_history.static_member(names::KILLED_PLAYERS);
    if killed_players.is_none() {
        warn!(member = names::KILLED_PLAYERS, "optional member not found");
    }
    let winning_faction = game_history.static_member(names::WINNING_FACTION);
    if winning_faction.is_none() {
        warn!(member = names::WINNING_FACTION, "optional member not found");
    }

    Ok(MetadataHandle {
        module,
        player_record_type,
        player_records,
        player_stats,
        role_history,
        killed_players,
        winning_faction,
        role_name_accessor: names::GET_ROLE_NAME,
    })
}

fn required_type(ty: Option<TypeRef>, name: &str) -> Result<TypeRef, LocateError> {
    ty.ok_or_else(|| {
        error!(type_name = name, "required type not found");
        LocateError::MetadataIncomplete(name.to_string())
    })
}

fn required_member(owner: &TypeRef, name: &str) -> Result<MemberRef, LocateError> {
    owner.static_member(name).ok_or_else(|| {
        let qualified = format!("{}.{}", owner.full_name(), name);
        error!(member = %qualified, "required member not found");
        LocateError::MetadataIncomplete(qualified)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::fixture::MatchFixture;
    use crate::bridge::memory::{MemoryModule, MemoryRuntime};

    #[test]
    fn locates_complete_module() {
        let runtime = MatchFixture::new().build();
        let handle = locate(&runtime).unwrap();
        assert_eq!(handle.module_name(), "TownOfUsMira");
        assert_eq!(handle.role_name_accessor(), "GetRoleName");
        assert!(handle.killed_players().is_some());
        assert!(handle.winning_faction().is_some());
    }

    #[test]
    fn candidate_order_beats_load_order() {
        let runtime = MemoryRuntime::new()
            .with_module(MemoryModule::new("TownOfUsMira", None))
            .with_module(MemoryModule::new("TownOfUs", None));
        let found = find_module(&runtime, &names::MODULE_CANDIDATES).unwrap();
        assert_eq!(found.name(), "TownOfUs");
    }

    #[test]
    fn substring_match_is_accepted() {
        let runtime = MemoryRuntime::new().with_module(MemoryModule::new("TownOfUsMira", None));
        let found = find_module(&runtime, &["TownOfUs"]).unwrap();
        assert_eq!(found.name(), "TownOfUsMira");
    }

    #[test]
    fn missing_module_lists_similar_names() {
        let runtime = MemoryRuntime::new()
            .with_module(MemoryModule::new("MiraAPI", None))
            .with_module(MemoryModule::new("Reactor", None));
        let err = locate(&runtime).unwrap_err();
        assert_eq!(
            err,
            LocateError::ModuleNotFound {
                similar: vec!["MiraAPI".to_string()]
            }
        );
        assert!(err.to_string().contains("MiraAPI"));
    }

    #[test]
    fn missing_roster_type_is_incomplete() {
        let runtime = MatchFixture::new().without("PlayerRecord").build();
        assert_eq!(
            locate(&runtime).unwrap_err(),
            LocateError::MetadataIncomplete("PlayerRecord".to_string())
        );
    }

    #[test]
    fn missing_required_member_is_named() {
        let runtime = MatchFixture::new().without("RoleHistory").build();
        assert_eq!(
            locate(&runtime).unwrap_err(),
            LocateError::MetadataIncomplete("TownOfUs.Modules.GameHistory.RoleHistory".to_string())
        );
    }

    #[test]
    fn optional_members_may_be_absent() {
        let runtime = MatchFixture::new()
            .without("KilledPlayers")
            .without("WinningFaction")
            .build();
        let handle = locate(&runtime).unwrap();
        assert!(handle.killed_players().is_none());
        assert!(handle.winning_faction().is_none());
    }
}
