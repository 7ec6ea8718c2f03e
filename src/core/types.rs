//! core::types
//!
//! Local value types for harvested match facts.
//!
//! # Types
//!
//! - [`RawPlayerRecord`] - One roster entry as read from the foreign module
//! - [`PlayerCounters`] - Per-player kill and guess counters
//! - [`KillEvent`] - One kill-log entry
//! - [`PlayerDetails`] - Task progress and identity from the live player
//!
//! None of these hold foreign objects; they are plain values that can be
//! moved to a background worker.

use serde::{Deserialize, Serialize};

/// Player identifier, unique within a match.
pub type PlayerId = u8;

/// Sentinel used wherever a role, team or platform cannot be determined.
pub const UNKNOWN: &str = "Unknown";

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPlayerRecord {
    pub player_id: PlayerId,
    /// Display name, possibly with markup
    pub display_name: String,
    pub is_winner: bool,
    /// Team label in its display form
    pub team_label: String,
    /// Free-text role/modifier/status summary
    pub descriptive_string: String,
}

impl Default for RawPlayerRecord {
    fn default() -> Self {
        Self {
            player_id: 0,
            display_name: String::new(),
            is_winner: false,
            team_label: UNKNOWN.to_string(),
            descriptive_string: String::new(),
        }
    }
}

/// Per-player counters. Absent entries are all zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCounters {
    pub correct_kills: i32,
    pub incorrect_kills: i32,
    pub correct_assassin_kills: i32,
    pub incorrect_assassin_kills: i32,
}

impl PlayerCounters {
    /// Apply the assassin sign correction.
    ///
    /// The foreign module decrements the correct-guess counter on a
    /// misguess, so a negative value counts misguesses. Its magnitude is
    /// moved to the incorrect counter and the correct counter becomes zero.
    ///
    /// # Example
    ///
    /// ```
    /// use tou_stats_exporter::core::types::PlayerCounters;
    ///
    /// let raw = PlayerCounters {
    ///     correct_assassin_kills: -2,
    ///     incorrect_assassin_kills: 1,
    ///     ..Default::default()
    /// };
    /// let fixed = raw.sign_corrected();
    /// assert_eq!(fixed.correct_assassin_kills, 0);
    /// assert_eq!(fixed.incorrect_assassin_kills, 3);
    /// ```
    pub fn sign_corrected(self) -> Self {
        if self.correct_assassin_kills >= 0 {
            return self;
        }
        Self {
            correct_assassin_kills: 0,
            incorrect_assassin_kills: self
                .incorrect_assassin_kills
                .saturating_add(self.correct_assassin_kills.saturating_abs()),
            ..self
        }
    }
}

/// One entry of the kill log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillEvent {
    pub killer_id: PlayerId,
    pub victim_id: PlayerId,
}

impl KillEvent {
    pub fn is_self_kill(&self) -> bool {
        self.killer_id == self.victim_id
    }
}

/// Facts read from a player's live object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDetails {
    pub total_tasks: u32,
    pub tasks_completed: u32,
    /// Friend code, `None` when blank
    pub friend_code: Option<String>,
    pub platform: String,
}

impl Default for PlayerDetails {
    fn default() -> Self {
        Self {
            total_tasks: 0,
            tasks_completed: 0,
            friend_code: None,
            platform: UNKNOWN.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn counters_default_to_zero() {
        let c = PlayerCounters::default();
        assert_eq!(c.correct_kills, 0);
        assert_eq!(c.incorrect_assassin_kills, 0);
    }

    #[test]
    fn sign_correction_moves_negative_guesses() {
        let c = PlayerCounters {
            correct_kills: 2,
            correct_assassin_kills: -2,
            incorrect_assassin_kills: 1,
            ..Default::default()
        }
        .sign_corrected();
        assert_eq!(c.correct_assassin_kills, 0);
        assert_eq!(c.incorrect_assassin_kills, 3);
        assert_eq!(c.correct_kills, 2);
    }

    #[test]
    fn self_kill_detection() {
        assert!(KillEvent { killer_id: 3, victim_id: 3 }.is_self_kill());
        assert!(!KillEvent { killer_id: 3, victim_id: 4 }.is_self_kill());
    }

    #[test]
    fn record_defaults() {
        let r = RawPlayerRecord::default();
        assert_eq!(r.team_label, "Unknown");
        assert!(!r.is_winner);
        assert_eq!(PlayerDetails::default().platform, "Unknown");
    }

    proptest! {
        #[test]
        fn negative_guesses_are_moved(v in -1000i32..0, inc in 0i32..1000) {
            let c = PlayerCounters {
                correct_assassin_kills: v,
                incorrect_assassin_kills: inc,
                ..Default::default()
            }
            .sign_corrected();
            prop_assert_eq!(c.correct_assassin_kills, 0);
            prop_assert_eq!(c.incorrect_assassin_kills, inc + v.abs());
        }

        #[test]
        fn non_negative_guesses_are_unchanged(v in 0i32..1000, inc in -1000i32..1000) {
            let c = PlayerCounters {
                correct_assassin_kills: v,
                incorrect_assassin_kills: inc,
                ..Default::default()
            };
            prop_assert_eq!(c.sign_corrected(), c);
        }
    }
}
