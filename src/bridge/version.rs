//! bridge::version
//!
//! Classifies the foreign module's version against known-good versions.
//!
//! # Design
//!
//! The verdict is advisory only. It is logged and attached to the bridge,
//! but harvesting proceeds regardless of the outcome; structural drift is
//! absorbed by the harvester's per-fact fault handling and the text
//! fallback.
//!
//! # Example
//!
//! ```
//! use tou_stats_exporter::bridge::{CompatibilityVerdict, UnsupportedReason, VersionGate};
//!
//! let gate = VersionGate::default();
//! assert_eq!(gate.classify("1.2.1"), CompatibilityVerdict::Supported);
//! assert_eq!(gate.classify("1.9.0"), CompatibilityVerdict::ProbablyCompatible { known_major: 1 });
//! assert_eq!(
//!     gate.classify("2.0.0"),
//!     CompatibilityVerdict::Unsupported(UnsupportedReason::Untested)
//! );
//! ```

use std::collections::BTreeSet;
use std::fmt;

/// Versions the bridge has been verified against.
pub const TESTED_VERSIONS: [&str; 2] = ["1.2.1", "1.2.0"];

/// Why a version is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// The module declared no version
    Unknown,
    /// The version string could not be parsed
    Unparseable,
    /// The version is listed as known to break the bridge
    KnownIncompatible,
    /// No tested version shares the major component
    Untested,
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedReason::Unknown => write!(f, "unknown"),
            UnsupportedReason::Unparseable => write!(f, "unparseable"),
            UnsupportedReason::KnownIncompatible => write!(f, "known incompatible"),
            UnsupportedReason::Untested => write!(f, "untested"),
        }
    }
}

/// Compatibility of the foreign module version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatibilityVerdict {
    /// Exactly a tested version
    Supported,
    /// Same major component as a tested version
    ProbablyCompatible { known_major: u32 },
    /// Anything else
    Unsupported(UnsupportedReason),
}

impl CompatibilityVerdict {
    pub fn is_supported(&self) -> bool {
        matches!(self, CompatibilityVerdict::Supported)
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, CompatibilityVerdict::Unsupported(_))
    }
}

impl fmt::Display for CompatibilityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompatibilityVerdict::Supported => write!(f, "Supported"),
            CompatibilityVerdict::ProbablyCompatible { known_major } => {
                write!(f, "Probably Compatible (tested major {})", known_major)
            }
            CompatibilityVerdict::Unsupported(reason) => write!(f, "Unsupported ({})", reason),
        }
    }
}

/// A parsed `major.minor[.build[.revision]]` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ModuleVersion {
    pub major: u32,
    pub minor: u32,
    pub build: Option<u32>,
    pub revision: Option<u32>,
}

impl ModuleVersion {
    /// Parse a version of two to four dot-separated unsigned integers.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<u32> = s
            .trim()
            .split('.')
            .map(|p| p.parse::<u32>().ok())
            .collect::<Option<_>>()?;

        match parts.as_slice() {
            [major, minor] => Some(Self {
                major: *major,
                minor: *minor,
                build: None,
                revision: None,
            }),
            [major, minor, build] => Some(Self {
                major: *major,
                minor: *minor,
                build: Some(*build),
                revision: None,
            }),
            [major, minor, build, revision] => Some(Self {
                major: *major,
                minor: *minor,
                build: Some(*build),
                revision: Some(*revision),
            }),
            _ => None,
        }
    }
}

/// Tested and known-incompatible version sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionGate {
    tested: BTreeSet<String>,
    incompatible: BTreeSet<String>,
}

impl Default for VersionGate {
    fn default() -> Self {
        Self {
            tested: TESTED_VERSIONS.iter().map(|v| v.to_string()).collect(),
            incompatible: BTreeSet::new(),
        }
    }
}

impl VersionGate {
    /// Create a gate with no tested versions.
    pub fn empty() -> Self {
        Self {
            tested: BTreeSet::new(),
            incompatible: BTreeSet::new(),
        }
    }

    pub fn with_tested(mut self, version: impl Into<String>) -> Self {
        self.tested.insert(version.into());
        self
    }

    pub fn with_incompatible(mut self, version: impl Into<String>) -> Self {
        self.incompatible.insert(version.into());
        self
    }

    /// Classify a version string.
    pub fn classify(&self, version: &str) -> CompatibilityVerdict {
        let version = version.trim();
        if version.is_empty() {
            return CompatibilityVerdict::Unsupported(UnsupportedReason::Unknown);
        }

        let Some(parsed) = ModuleVersion::parse(version) else {
            return CompatibilityVerdict::Unsupported(UnsupportedReason::Unparseable);
        };

        if self.incompatible.contains(version) {
            return CompatibilityVerdict::Unsupported(UnsupportedReason::KnownIncompatible);
        }

        if self.tested.contains(version) {
            return CompatibilityVerdict::Supported;
        }

        let same_major = self
            .tested
            .iter()
            .filter_map(|t| ModuleVersion::parse(t))
            .any(|t| t.major == parsed.major);

        if same_major {
            CompatibilityVerdict::ProbablyCompatible {
                known_major: parsed.major,
            }
        } else {
            CompatibilityVerdict::Unsupported(UnsupportedReason::Untested)
        }
    }

    /// Classify an optional version; a missing version is `Unknown`.
    pub fn classify_opt(&self, version: Option<&str>) -> CompatibilityVerdict {
        self.classify(version.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_two_to_four_components() {
        assert!(ModuleVersion::parse("1").is_none());
        assert_eq!(ModuleVersion::parse("1.2").map(|v| v.minor), Some(2));
        assert_eq!(ModuleVersion::parse("1.2.3").and_then(|v| v.build), Some(3));
        assert_eq!(
            ModuleVersion::parse("1.2.3.4").and_then(|v| v.revision),
            Some(4)
        );
        assert!(ModuleVersion::parse("1.2.3.4.5").is_none());
        assert!(ModuleVersion::parse("1.x").is_none());
        assert!(ModuleVersion::parse("-1.0").is_none());
    }

    #[test]
    fn tested_version_is_supported() {
        let gate = VersionGate::default();
        assert_eq!(gate.classify("1.2.0"), CompatibilityVerdict::Supported);
        assert!(gate.classify(" 1.2.1 ").is_supported());
    }

    #[test]
    fn same_major_is_probably_compatible() {
        let gate = VersionGate::default();
        assert_eq!(
            gate.classify("1.2.1.0"),
            CompatibilityVerdict::ProbablyCompatible { known_major: 1 }
        );
    }

    #[test]
    fn unparseable_and_unknown() {
        let gate = VersionGate::default();
        assert_eq!(
            gate.classify("v1.2"),
            CompatibilityVerdict::Unsupported(UnsupportedReason::Unparseable)
        );
        assert_eq!(
            gate.classify(""),
            CompatibilityVerdict::Unsupported(UnsupportedReason::Unknown)
        );
        assert_eq!(
            gate.classify_opt(None),
            CompatibilityVerdict::Unsupported(UnsupportedReason::Unknown)
        );
    }

    #[test]
    fn incompatible_list_wins_over_tested() {
        let gate = VersionGate::default().with_incompatible("1.2.1");
        assert_eq!(
            gate.classify("1.2.1"),
            CompatibilityVerdict::Unsupported(UnsupportedReason::KnownIncompatible)
        );
    }

    #[test]
    fn added_tested_version_is_supported() {
        let gate = VersionGate::empty().with_tested("3.0.0");
        assert!(gate.classify("3.0.0").is_supported());
        assert!(gate.classify("1.2.1").is_unsupported());
    }

    #[test]
    fn verdict_display() {
        assert_eq!(CompatibilityVerdict::Supported.to_string(), "Supported");
        assert_eq!(
            CompatibilityVerdict::Unsupported(UnsupportedReason::Unparseable).to_string(),
            "Unsupported (unparseable)"
        );
    }
}
