//! bridge::names
//!
//! Names of the foreign types, members and methods the bridge depends on.
//!
//! These are the only coupling points with the foreign module. When the
//! module renames something, this is the file to change.

/// Module names tried in order; exact or substring match.
pub const MODULE_CANDIDATES: [&str; 3] = ["TownOfUs", "TownOfUsMira", "TownOfUs.dll"];

/// Substrings used to list similar modules when none matched.
pub const MODULE_HINTS: [&str; 2] = ["Town", "Mira"];

// Types
pub const END_GAME_PATCHES: &str = "TownOfUs.Patches.EndGamePatches";
pub const END_GAME_DATA: &str = "EndGameData";
pub const PLAYER_RECORD: &str = "PlayerRecord";
pub const GAME_HISTORY: &str = "TownOfUs.Modules.GameHistory";
pub const MODIFIER_BASE: &str = "MiraAPI.Modifiers.GameModifier";

// Static members
pub const PLAYER_RECORDS: &str = "PlayerRecords";
pub const PLAYER_STATS: &str = "PlayerStats";
pub const ROLE_HISTORY: &str = "RoleHistory";
pub const KILLED_PLAYERS: &str = "KilledPlayers";
pub const WINNING_FACTION: &str = "WinningFaction";

// Methods
pub const GET_ROLE_NAME: &str = "GetRoleName";
pub const GET_MODIFIERS: &str = "GetModifiers";

/// Role names containing this marker are ghost roles.
pub const GHOST_MARKER: &str = "Ghost";

/// Fields of a roster entry.
pub mod record {
    pub const PLAYER_ID: &str = "PlayerId";
    pub const PLAYER_NAME: &str = "PlayerName";
    pub const WINNER: &str = "Winner";
    pub const TEAM: &str = "Team";
    pub const ROLE_STRING: &str = "RoleString";
}

/// Fields of a per-player counters entry.
pub mod stats {
    pub const CORRECT_KILLS: &str = "CorrectKills";
    pub const INCORRECT_KILLS: &str = "IncorrectKills";
    pub const CORRECT_ASSASSIN_KILLS: &str = "CorrectAssassinKills";
    pub const INCORRECT_ASSASSIN_KILLS: &str = "IncorrectAssassinKills";
}

/// Fields of a kill-log entry.
pub mod kill {
    pub const KILLER_ID: &str = "KillerId";
    pub const VICTIM_ID: &str = "VictimId";
}

/// Fields of a modifier instance.
pub const MODIFIER_NAME: &str = "ModifierName";

/// Fields of a live player object and its network data.
pub mod player {
    pub const PLAYER_ID: &str = "PlayerId";
    pub const DATA: &str = "Data";
    pub const TASKS: &str = "Tasks";
    pub const TASK_COMPLETE: &str = "Complete";
    pub const FRIEND_CODE: &str = "FriendCode";
    pub const PLATFORM: &str = "Platform";
}
