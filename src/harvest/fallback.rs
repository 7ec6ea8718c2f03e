//! harvest::fallback
//!
//! Recovers roles and modifiers from a player's descriptive string.
//!
//! # Format
//!
//! ```text
//! Sheriff (Flash) (2/4) | Alive > Sheriff | Killed By Red
//! ```
//!
//! - role history entries are separated by `" > "`
//! - an entry may end in a status suffix introduced by `" |"` (dropped)
//! - then a task-progress suffix `(<digits>/<digits>)` (dropped)
//! - the remaining parenthesised groups are modifier lists, comma separated
//! - the role name is the text before the first remaining `(`
//!
//! Modifiers are collected in one pass over all cleaned entries, so they
//! are not attributed to the entry they appeared in.
//!
//! # Example
//!
//! ```
//! use tou_stats_exporter::harvest::fallback::parse;
//!
//! let parsed = parse("Sheriff (Flash) (2/4) | Alive > Sheriff | Killed By Red");
//! assert_eq!(parsed.roles, vec!["Sheriff", "Sheriff"]);
//! assert_eq!(parsed.modifiers, vec!["Flash"]);
//! assert_eq!(parsed.role().unwrap(), "Sheriff");
//! ```

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::core::markup::strip_markup;

/// Separator between role history entries.
pub const ENTRY_SEPARATOR: &str = " > ";

/// Introduces the status suffix of an entry.
const STATUS_MARKER: &str = " |";

static TASK_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\d+/\d+\)\s*$").expect("valid regex"));

static MODIFIER_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)").expect("valid regex"));

/// No role name could be recovered from a descriptive string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no role found in descriptive string '{0}'")]
pub struct ParseAmbiguous(pub String);

/// Roles and modifiers recovered from a descriptive string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackParse {
    source: String,
    /// Role names, oldest first
    pub roles: Vec<String>,
    /// Modifier names in order of appearance
    pub modifiers: Vec<String>,
}

impl FallbackParse {
    /// Most recent role.
    ///
    /// # Errors
    ///
    /// Returns `ParseAmbiguous` if no role was recovered; callers report
    /// the role as unknown.
    pub fn role(&self) -> Result<&str, ParseAmbiguous> {
        self.roles
            .last()
            .map(String::as_str)
            .ok_or_else(|| ParseAmbiguous(self.source.clone()))
    }
}

/// Parse a descriptive string.
pub fn parse(descriptive: &str) -> FallbackParse {
    FallbackParse {
        source: descriptive.to_string(),
        roles: parse_roles(descriptive),
        modifiers: parse_modifiers(descriptive),
    }
}

/// Role names, one per entry that yields a non-empty name.
pub fn parse_roles(descriptive: &str) -> Vec<String> {
    entries(descriptive)
        .filter_map(|entry| {
            let role = match entry.find('(') {
                Some(idx) if idx > 0 => entry[..idx].trim(),
                _ => entry.as_str(),
            };
            (!role.is_empty()).then(|| role.to_string())
        })
        .collect()
}

/// Modifier names from every parenthesised group of every entry.
pub fn parse_modifiers(descriptive: &str) -> Vec<String> {
    let cleaned = entries(descriptive).collect::<Vec<_>>().join(ENTRY_SEPARATOR);

    MODIFIER_GROUP
        .captures_iter(&cleaned)
        .filter_map(|caps| caps.get(1))
        .flat_map(|group| group.as_str().split(','))
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

/// Entries with markup, status and task suffixes removed.
fn entries(descriptive: &str) -> impl Iterator<Item = String> + '_ {
    descriptive
        .split(ENTRY_SEPARATOR)
        .filter(|part| !part.is_empty())
        .map(clean_entry)
}

fn clean_entry(part: &str) -> String {
    let mut entry = strip_markup(part);
    if let Some(idx) = entry.find(STATUS_MARKER) {
        if idx > 0 {
            entry.truncate(idx);
        }
    }
    TASK_SUFFIX.replace(entry.trim(), "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn single_role_with_everything() {
        let parsed = parse("<color=#FFFF00>Sheriff</color> (Flash, Giant) (0/4) | Dead");
        assert_eq!(parsed.roles, vec!["Sheriff"]);
        assert_eq!(parsed.modifiers, vec!["Flash", "Giant"]);
    }

    #[test]
    fn role_change_history() {
        let parsed = parse("Amnesiac | Alive > Jester (Button Barry) > Survivor");
        assert_eq!(parsed.roles, vec!["Amnesiac", "Jester", "Survivor"]);
        assert_eq!(parsed.modifiers, vec!["Button Barry"]);
        assert_eq!(parsed.role().unwrap(), "Survivor");
    }

    #[test]
    fn task_suffix_only_stripped_at_end() {
        let parsed = parse("Engineer (1/2) (Torch)");
        assert_eq!(parsed.roles, vec!["Engineer"]);
        assert_eq!(parsed.modifiers, vec!["1/2", "Torch"]);
    }

    #[test]
    fn leading_paren_is_kept_as_role() {
        let parsed = parse("(Lovers)");
        assert_eq!(parsed.roles, vec!["(Lovers)"]);
        assert_eq!(parsed.modifiers, vec!["Lovers"]);
    }

    #[test]
    fn status_marker_at_start_is_not_a_status() {
        assert_eq!(parse_roles(" | Alive"), vec!["| Alive"]);
    }

    #[test]
    fn empty_fragments_are_dropped() {
        assert_eq!(parse_modifiers("Mayor ( , Tiebreaker,, )"), vec!["Tiebreaker"]);
    }

    #[test]
    fn no_role_is_ambiguous() {
        let parsed = parse(" > ");
        assert!(parsed.roles.is_empty());
        assert_eq!(
            parsed.role().unwrap_err(),
            ParseAmbiguous(" > ".to_string())
        );
        assert!(parse("").role().is_err());
    }

    #[test]
    fn markup_only_entry_is_skipped() {
        assert_eq!(parse_roles("<color=#FF0000></color> > Mayor"), vec!["Mayor"]);
    }

    fn word() -> impl Strategy<Value = String> {
        "[A-Z][a-z]{1,8}( [A-Z][a-z]{1,8})?"
    }

    fn segment() -> impl Strategy<Value = (String, Vec<String>, String)> {
        (
            word(),
            prop::collection::vec(word(), 0..3),
            prop::option::of((0u8..10, 0u8..10)),
            prop::option::of("[A-Za-z ]{0,12}"),
        )
            .prop_map(|(role, mods, tasks, status)| {
                let mut text = role.clone();
                if !mods.is_empty() {
                    text.push_str(&format!(" ({})", mods.join(", ")));
                }
                if let Some((done, total)) = tasks {
                    text.push_str(&format!(" ({}/{})", done, total));
                }
                if let Some(status) = status {
                    text.push_str(&format!(" |{}", status));
                }
                (role, mods, text)
            })
    }

    proptest! {
        #[test]
        fn recovers_every_role_and_modifier(segments in prop::collection::vec(segment(), 1..5)) {
            let text = segments.iter().map(|(_, _, t)| t.as_str()).collect::<Vec<_>>().join(" > ");
            let parsed = parse(&text);

            let roles: Vec<String> = segments.iter().map(|(r, _, _)| r.clone()).collect();
            let modifiers: Vec<String> = segments.iter().flat_map(|(_, m, _)| m.clone()).collect();

            prop_assert_eq!(parsed.roles, roles);
            prop_assert_eq!(parsed.modifiers, modifiers);
        }

        #[test]
        fn parsing_is_deterministic(s in ".{0,60}") {
            prop_assert_eq!(parse(&s), parse(&s));
        }
    }
}
