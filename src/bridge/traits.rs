//! bridge::traits
//!
//! Runtime binding interface for the foreign game-logic module.
//!
//! # Design
//!
//! The foreign module is versioned independently of this crate and there is
//! no compile-time contract with it. Every type, static member, field and
//! method is therefore located by name at runtime through the traits in this
//! module. Exactly one host-specific introspection adapter implements them;
//! everything else (locator, harvester, adapter) depends only on the traits.
//!
//! Lookups distinguish "absent" from "present but null":
//! - [`ForeignObject::member`] returns `None` when the member does not exist
//! - it returns `Some(ForeignValue::Null)` when the member exists but is null
//!
//! # Example
//!
//! ```
//! use tou_stats_exporter::bridge::memory::MemoryObject;
//! use tou_stats_exporter::bridge::ForeignValue;
//!
//! let record = MemoryObject::new("PlayerRecord")
//!     .with_member("PlayerId", 3u8)
//!     .with_member("PlayerName", "Blue")
//!     .into_value();
//!
//! let obj = record.as_object().unwrap();
//! assert_eq!(obj.member("PlayerId").and_then(|v| v.as_player_id()), Some(3));
//! assert!(obj.member("Missing").is_none());
//! ```

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Shared handle to a foreign object.
pub type ObjectRef = Arc<dyn ForeignObject>;

/// Shared handle to a resolved foreign type.
pub type TypeRef = Arc<dyn ForeignType>;

/// Shared handle to a resolved static member.
pub type MemberRef = Arc<dyn ForeignMember>;

/// Shared handle to a loaded foreign module.
pub type ModuleRef = Arc<dyn ForeignModule>;

/// Errors raised by the binding layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindingError {
    /// A field or property was not found on the object or type.
    #[error("member not found: {0}")]
    MemberNotFound(String),

    /// A method was not found on the object.
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// A type could not be resolved in the module.
    #[error("type not found: {0}")]
    TypeNotFound(String),

    /// The foreign side raised an error while reading or invoking.
    #[error("foreign invocation failed: {0}")]
    Invocation(String),

    /// The value does not expose any collection capability.
    #[error("value of type '{0}' is not a collection")]
    NotACollection(String),
}

/// Value of a foreign enumeration, kept in its display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Declaring enum type name
    pub type_name: String,
    /// Variant name as rendered by the foreign runtime
    pub name: String,
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A value read from the foreign module.
#[derive(Debug, Clone)]
pub enum ForeignValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Enum(EnumValue),
    Object(ObjectRef),
}

impl ForeignValue {
    /// Check whether this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, ForeignValue::Null)
    }

    /// Borrow the text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ForeignValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value the way the foreign runtime would display it.
    ///
    /// Text is returned as-is, enums by variant name, scalars by their
    /// usual formatting. Null and objects have no display form.
    pub fn as_display_text(&self) -> Option<String> {
        match self {
            ForeignValue::Text(s) => Some(s.clone()),
            ForeignValue::Enum(e) => Some(e.name.clone()),
            ForeignValue::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
            ForeignValue::Int(i) => Some(i.to_string()),
            ForeignValue::Float(x) => Some(x.to_string()),
            ForeignValue::Null | ForeignValue::Object(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ForeignValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ForeignValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Interpret the value as a player id (0-255).
    ///
    /// Returns `None` for non-integers and out-of-range integers.
    pub fn as_player_id(&self) -> Option<u8> {
        self.as_i64().and_then(|i| u8::try_from(i).ok())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ForeignValue::Float(x) => Some(*x),
            ForeignValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            ForeignValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Name of the runtime type of this value, for diagnostics.
    pub fn kind(&self) -> &str {
        match self {
            ForeignValue::Null => "null",
            ForeignValue::Bool(_) => "bool",
            ForeignValue::Int(_) => "int",
            ForeignValue::Float(_) => "float",
            ForeignValue::Text(_) => "text",
            ForeignValue::Enum(e) => &e.type_name,
            ForeignValue::Object(o) => o.type_name(),
        }
    }
}

impl From<&str> for ForeignValue {
    fn from(s: &str) -> Self {
        ForeignValue::Text(s.to_string())
    }
}

impl From<String> for ForeignValue {
    fn from(s: String) -> Self {
        ForeignValue::Text(s)
    }
}

impl From<bool> for ForeignValue {
    fn from(b: bool) -> Self {
        ForeignValue::Bool(b)
    }
}

impl From<i64> for ForeignValue {
    fn from(i: i64) -> Self {
        ForeignValue::Int(i)
    }
}

impl From<i32> for ForeignValue {
    fn from(i: i32) -> Self {
        ForeignValue::Int(i64::from(i))
    }
}

impl From<u8> for ForeignValue {
    fn from(i: u8) -> Self {
        ForeignValue::Int(i64::from(i))
    }
}

impl From<f64> for ForeignValue {
    fn from(x: f64) -> Self {
        ForeignValue::Float(x)
    }
}

impl From<EnumValue> for ForeignValue {
    fn from(e: EnumValue) -> Self {
        ForeignValue::Enum(e)
    }
}

impl From<ObjectRef> for ForeignValue {
    fn from(o: ObjectRef) -> Self {
        ForeignValue::Object(o)
    }
}

/// An object living in the foreign module, inspected by name.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: harvested values are handed to a
/// background worker.
pub trait ForeignObject: Send + Sync + fmt::Debug {
    /// Runtime type name of the object.
    fn type_name(&self) -> &str;

    /// Read a field or property by name.
    ///
    /// Returns `None` if no such member exists.
    fn member(&self, name: &str) -> Option<ForeignValue>;

    /// Check whether a non-generic method with this name exists.
    fn has_method(&self, name: &str) -> bool;

    /// Invoke a non-generic method by name.
    fn invoke(&self, name: &str, args: &[ForeignValue]) -> Result<ForeignValue, BindingError>;

    /// Check whether a generic method with this name exists.
    fn has_generic_method(&self, _name: &str) -> bool {
        false
    }

    /// Invoke a generic method, closing it over `type_args`.
    fn invoke_generic(
        &self,
        name: &str,
        _type_args: &[TypeRef],
        _args: &[ForeignValue],
    ) -> Result<ForeignValue, BindingError> {
        Err(BindingError::MethodNotFound(name.to_string()))
    }

    /// Generic iteration capability.
    ///
    /// Returns `None` when the object cannot be iterated directly.
    fn items(&self) -> Option<Vec<ForeignValue>> {
        None
    }

    /// Dictionary iteration capability: key/value pairs in iteration order.
    ///
    /// Returns `None` when the object is not dictionary-like.
    fn entries(&self) -> Option<Vec<(ForeignValue, ForeignValue)>> {
        None
    }
}

/// A type resolved from the foreign module.
pub trait ForeignType: Send + Sync + fmt::Debug {
    /// Fully qualified type name.
    fn full_name(&self) -> &str;

    /// Resolve a public nested type by simple name.
    fn nested_type(&self, name: &str) -> Option<TypeRef>;

    /// Resolve a public static field or property by name.
    fn static_member(&self, name: &str) -> Option<MemberRef>;
}

/// A resolved static field or property.
pub trait ForeignMember: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Read the member's current value.
    fn read(&self) -> Result<ForeignValue, BindingError>;
}

/// A module loaded into the host process.
pub trait ForeignModule: Send + Sync + fmt::Debug {
    /// Declared module name.
    fn name(&self) -> &str;

    /// Declared module version, if the module carries one.
    fn version(&self) -> Option<String>;

    /// Resolve a top-level type by fully qualified name.
    fn find_type(&self, full_name: &str) -> Option<TypeRef>;
}

/// Match-level information provided by the host game.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    /// Lobby code as shown to players
    pub lobby_code: String,
    /// Host game mode name
    pub game_mode: String,
    /// Numeric map identifier
    pub map_id: u8,
    /// Seconds elapsed since the match started
    pub duration_secs: f32,
}

impl SessionInfo {
    /// Game mode name of the non-scored seek variant.
    pub const HIDE_AND_SEEK: &'static str = "HideNSeek";

    /// Check whether the match is the non-scored seek variant.
    pub fn is_hide_and_seek(&self) -> bool {
        self.game_mode == Self::HIDE_AND_SEEK
    }
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self {
            lobby_code: String::new(),
            game_mode: "Unknown".to_string(),
            map_id: 0,
            duration_secs: 0.0,
        }
    }
}

/// The host process: loaded modules plus a few host-owned facts.
pub trait ForeignRuntime: Send + Sync + fmt::Debug {
    /// All modules currently loaded, in load order.
    fn modules(&self) -> Vec<ModuleRef>;

    /// Collection of live player objects.
    fn live_players(&self) -> Result<ForeignValue, BindingError>;

    /// Current match information.
    fn session(&self) -> SessionInfo;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_id_rejects_out_of_range() {
        assert_eq!(ForeignValue::Int(0).as_player_id(), Some(0));
        assert_eq!(ForeignValue::Int(255).as_player_id(), Some(255));
        assert_eq!(ForeignValue::Int(256).as_player_id(), None);
        assert_eq!(ForeignValue::Int(-1).as_player_id(), None);
        assert_eq!(ForeignValue::from("3").as_player_id(), None);
    }

    #[test]
    fn enum_display_text_is_variant_name() {
        let team = ForeignValue::Enum(EnumValue {
            type_name: "ModdedRoleTeams".into(),
            name: "Impostor".into(),
        });
        assert_eq!(team.as_display_text().as_deref(), Some("Impostor"));
        assert_eq!(team.kind(), "ModdedRoleTeams");
    }

    #[test]
    fn null_has_no_display_text() {
        assert!(ForeignValue::Null.is_null());
        assert!(ForeignValue::Null.as_display_text().is_none());
    }

    #[test]
    fn hide_and_seek_detection() {
        let mut session = SessionInfo::default();
        assert!(!session.is_hide_and_seek());
        session.game_mode = "HideNSeek".into();
        assert!(session.is_hide_and_seek());
    }

    #[test]
    fn binding_error_display() {
        assert_eq!(
            BindingError::MemberNotFound("Count".into()).to_string(),
            "member not found: Count"
        );
        assert_eq!(
            BindingError::NotACollection("Foo".into()).to_string(),
            "value of type 'Foo' is not a collection"
        );
    }
}
