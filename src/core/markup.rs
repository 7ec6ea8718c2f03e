//! core::markup
//!
//! Display markup removal for foreign display strings.
//!
//! The foreign module decorates names with rich-text tags. Before any
//! display string is exported, inline colour-start tags of the form
//! `<color=#HEX>` are removed, the colour/bold/italic close tags and the
//! bold/italic open tags are removed, and the result is trimmed.
//!
//! # Example
//!
//! ```
//! use tou_stats_exporter::core::markup::strip_markup;
//!
//! assert_eq!(strip_markup("<color=#FF0000>Red</color>"), "Red");
//! assert_eq!(strip_markup("  <b>Sheriff</b> "), "Sheriff");
//! ```

use std::sync::LazyLock;

use regex::Regex;

static COLOR_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<color=#[A-Fa-f0-9]+>").expect("valid regex"));

const PLAIN_TAGS: [&str; 5] = ["</color>", "<b>", "</b>", "<i>", "</i>"];

/// Strip display markup and surrounding whitespace.
///
/// Idempotent: stripping an already stripped string returns it unchanged.
pub fn strip_markup(text: &str) -> String {
    let mut stripped = COLOR_START.replace_all(text, "").into_owned();
    for tag in PLAIN_TAGS {
        stripped = stripped.replace(tag, "");
    }
    let trimmed = stripped.trim();

    // Removing tags can splice together a new tag, e.g. "<<b>b>".
    if trimmed.len() != text.len() && (trimmed.contains('<') && trimmed.contains('>')) {
        return strip_markup(trimmed);
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn removes_colour_tags() {
        assert_eq!(strip_markup("<color=#aaBB00>Blue</color>"), "Blue");
        assert_eq!(
            strip_markup("<color=#FF0000>Imp</color> and <color=#00FF00>Crew</color>"),
            "Imp and Crew"
        );
    }

    #[test]
    fn removes_bold_and_italic() {
        assert_eq!(strip_markup("<b><i>Mayor</i></b>"), "Mayor");
    }

    #[test]
    fn keeps_non_hex_colour_tags() {
        assert_eq!(strip_markup("<color=red>x"), "<color=red>x");
    }

    #[test]
    fn spliced_tags_are_removed() {
        assert_eq!(strip_markup("<<b>b>Bold"), "Bold");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(strip_markup(""), "");
        assert_eq!(strip_markup("   "), "");
    }

    proptest! {
        #[test]
        fn stripping_is_idempotent(s in "[ a-zA-Z0-9<>/=#bic]{0,40}") {
            let once = strip_markup(&s);
            prop_assert_eq!(strip_markup(&once), once);
        }

        #[test]
        fn tagged_names_strip_to_plain(name in "[A-Za-z][A-Za-z ]{0,10}[A-Za-z]", hex in "[0-9A-F]{6}") {
            let tagged = format!("<color=#{}><b>{}</b></color>", hex, name);
            prop_assert_eq!(strip_markup(&tagged), name);
        }
    }
}
