//! bridge::snapshot
//!
//! Loads a host runtime from a JSON snapshot of the foreign module's state.
//!
//! Snapshots let the exporter run outside the game process, which is how
//! the `tou-stats` command line drives the pipeline.
//!
//! # Format
//!
//! ```json
//! {
//!   "session": { "lobbyCode": "ABCDEF", "gameMode": "Normal", "mapId": 2, "durationSecs": 612.5 },
//!   "modules": [
//!     {
//!       "name": "TownOfUsMira",
//!       "version": "1.2.1",
//!       "types": [
//!         { "name": "TownOfUs.Modules.GameHistory", "statics": { "WinningFaction": "Crewmates" } }
//!       ]
//!     }
//!   ],
//!   "livePlayers": []
//! }
//! ```
//!
//! Types may carry `nested` types (keyed by simple name) and `statics`.
//! Values are plain JSON with a few reserved keys:
//!
//! - arrays are iterable lists
//! - `{"$indexed": [...]}` is a list reachable only by `Count` and `get_Item`
//! - `{"$entries": [[k, v], ...]}` is a dictionary
//! - `{"$pairs": [[k, v], ...]}` is a list of `Key`/`Value` pair objects
//! - `{"$enum": "Impostor", "$type": "ModdedRoleTeams"}` is an enum value
//! - any other object is a foreign object; `$type` names its type,
//!   `$methods` maps method names to results, `$generic` maps generic
//!   method names to results by type argument, `$faults` lists members and
//!   methods that fail, and every other key is a member

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::memory::{MemoryModule, MemoryObject, MemoryRuntime, MemoryType};
use super::traits::{EnumValue, ForeignValue, SessionInfo};

/// Errors from loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot file could not be read.
    #[error("failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot is not valid JSON or does not match the layout.
    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value uses a reserved key incorrectly.
    #[error("invalid snapshot value: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFile {
    #[serde(default)]
    session: SnapshotSession,
    #[serde(default)]
    modules: Vec<SnapshotModule>,
    #[serde(default)]
    live_players: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SnapshotSession {
    lobby_code: String,
    game_mode: String,
    map_id: u8,
    duration_secs: f32,
}

impl Default for SnapshotSession {
    fn default() -> Self {
        let session = SessionInfo::default();
        Self {
            lobby_code: session.lobby_code,
            game_mode: session.game_mode,
            map_id: session.map_id,
            duration_secs: session.duration_secs,
        }
    }
}

impl From<SnapshotSession> for SessionInfo {
    fn from(s: SnapshotSession) -> Self {
        SessionInfo {
            lobby_code: s.lobby_code,
            game_mode: s.game_mode,
            map_id: s.map_id,
            duration_secs: s.duration_secs,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotModule {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    types: Vec<SnapshotType>,
}

#[derive(Debug, Deserialize)]
struct SnapshotType {
    name: String,
    #[serde(default)]
    nested: BTreeMap<String, SnapshotType>,
    #[serde(default)]
    statics: BTreeMap<String, Value>,
}

/// Load a snapshot file into an in-memory runtime.
pub fn load(path: &Path) -> Result<MemoryRuntime, SnapshotError> {
    let text = std::fs::read_to_string(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

/// Parse snapshot JSON into an in-memory runtime.
pub fn parse(text: &str) -> Result<MemoryRuntime, SnapshotError> {
    let file: SnapshotFile = serde_json::from_str(text)?;

    let mut runtime = MemoryRuntime::new().with_session(file.session.into());
    for module in file.modules {
        debug!(module = %module.name, types = module.types.len(), "loading snapshot module");
        let mut loaded = MemoryModule::new(module.name, module.version.as_deref());
        for ty in module.types {
            loaded = loaded.with_type(build_type(ty)?);
        }
        runtime = runtime.with_module(loaded);
    }
    for player in &file.live_players {
        runtime = runtime.with_live_player(to_foreign(player)?);
    }
    Ok(runtime)
}

fn build_type(ty: SnapshotType) -> Result<MemoryType, SnapshotError> {
    let mut built = MemoryType::new(ty.name);
    for (name, value) in &ty.statics {
        built = built.with_static(name.as_str(), to_foreign(value)?);
    }
    for (name, nested) in ty.nested {
        built = built.with_nested(name, build_type(nested)?);
    }
    Ok(built)
}

/// Convert a JSON value into a foreign value.
pub fn to_foreign(value: &Value) -> Result<ForeignValue, SnapshotError> {
    Ok(match value {
        Value::Null => ForeignValue::Null,
        Value::Bool(b) => ForeignValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => ForeignValue::Int(i),
            None => ForeignValue::Float(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => ForeignValue::Text(s.clone()),
        Value::Array(items) => MemoryObject::list(to_foreign_all(items)?).into_value(),
        Value::Object(map) => object_to_foreign(map)?,
    })
}

fn to_foreign_all(items: &[Value]) -> Result<Vec<ForeignValue>, SnapshotError> {
    items.iter().map(to_foreign).collect()
}

fn object_to_foreign(map: &Map<String, Value>) -> Result<ForeignValue, SnapshotError> {
    if let Some(variant) = map.get("$enum") {
        let name = variant
            .as_str()
            .ok_or_else(|| SnapshotError::Invalid("$enum must be a string".into()))?;
        let type_name = map.get("$type").and_then(Value::as_str).unwrap_or("Enum");
        return Ok(ForeignValue::Enum(EnumValue {
            type_name: type_name.to_string(),
            name: name.to_string(),
        }));
    }
    if let Some(items) = map.get("$indexed") {
        let items = expect_array(items, "$indexed")?;
        return Ok(MemoryObject::indexed(to_foreign_all(items)?).into_value());
    }
    if let Some(entries) = map.get("$entries") {
        return Ok(MemoryObject::dictionary(pairs_of(entries, "$entries")?).into_value());
    }
    if let Some(entries) = map.get("$pairs") {
        return Ok(MemoryObject::pairs(pairs_of(entries, "$pairs")?).into_value());
    }

    let type_name = map.get("$type").and_then(Value::as_str).unwrap_or("Object");
    let mut obj = MemoryObject::new(type_name);

    for (key, value) in map {
        match key.as_str() {
            "$type" => {}
            "$methods" => {
                for (name, result) in expect_object(value, "$methods")? {
                    obj = obj.with_method(name.as_str(), to_foreign(result)?);
                }
            }
            "$generic" => {
                for (name, by_type) in expect_object(value, "$generic")? {
                    for (type_arg, result) in expect_object(by_type, "$generic")? {
                        obj = obj.with_generic_method(name.as_str(), type_arg.as_str(), to_foreign(result)?);
                    }
                }
            }
            "$faults" => {
                for name in expect_array(value, "$faults")? {
                    let name = name
                        .as_str()
                        .ok_or_else(|| SnapshotError::Invalid("$faults entries must be strings".into()))?;
                    obj = obj.with_fault(name);
                }
            }
            other if other.starts_with('$') => {
                return Err(SnapshotError::Invalid(format!("unknown reserved key {}", other)));
            }
            member => obj = obj.with_member(member, to_foreign(value)?),
        }
    }
    Ok(obj.into_value())
}

fn pairs_of(value: &Value, key: &str) -> Result<Vec<(ForeignValue, ForeignValue)>, SnapshotError> {
    expect_array(value, key)?
        .iter()
        .map(|pair| match pair.as_array().map(Vec::as_slice) {
            Some([k, v]) => Ok((to_foreign(k)?, to_foreign(v)?)),
            _ => Err(SnapshotError::Invalid(format!(
                "{} elements must be [key, value] pairs",
                key
            ))),
        })
        .collect()
}

fn expect_array<'a>(value: &'a Value, key: &str) -> Result<&'a Vec<Value>, SnapshotError> {
    value
        .as_array()
        .ok_or_else(|| SnapshotError::Invalid(format!("{} must be an array", key)))
}

fn expect_object<'a>(value: &'a Value, key: &str) -> Result<&'a Map<String, Value>, SnapshotError> {
    value
        .as_object()
        .ok_or_else(|| SnapshotError::Invalid(format!("{} must be an object", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::adapter::{to_entries, to_sequence};
    use crate::bridge::traits::ForeignRuntime;
    use serde_json::json;

    #[test]
    fn parses_session_and_modules() {
        let runtime = parse(
            &json!({
                "session": { "lobbyCode": "QWERTY", "gameMode": "HideNSeek", "mapId": 4 },
                "modules": [{ "name": "TownOfUs", "version": "1.2.1", "types": [
                    { "name": "TownOfUs.Modules.GameHistory", "statics": { "WinningFaction": "Crewmates" } }
                ]}]
            })
            .to_string(),
        )
        .unwrap();

        let session = runtime.session();
        assert_eq!(session.lobby_code, "QWERTY");
        assert_eq!(session.map_id, 4);
        assert!(session.is_hide_and_seek());

        let module = &runtime.modules()[0];
        assert_eq!(module.version().as_deref(), Some("1.2.1"));
        let faction = module
            .find_type("TownOfUs.Modules.GameHistory")
            .and_then(|t| t.static_member("WinningFaction"))
            .unwrap()
            .read()
            .unwrap();
        assert_eq!(faction.as_text(), Some("Crewmates"));
    }

    #[test]
    fn reserved_keys_build_collections_and_enums() {
        let indexed = to_foreign(&json!({ "$indexed": [1, null, 2] })).unwrap();
        assert_eq!(to_sequence(&indexed).len(), 2);
        assert!(indexed.as_object().unwrap().items().is_none());

        let dict = to_foreign(&json!({ "$entries": [[0, "a"], [1, "b"]] })).unwrap();
        assert_eq!(to_entries(&dict).len(), 2);

        let pairs = to_foreign(&json!({ "$pairs": [[0, "a"]] })).unwrap();
        assert_eq!(to_entries(&pairs)[0].1.as_text(), Some("a"));

        let team = to_foreign(&json!({ "$enum": "Impostor", "$type": "ModdedRoleTeams" })).unwrap();
        assert_eq!(team.as_display_text().as_deref(), Some("Impostor"));
    }

    #[test]
    fn objects_carry_members_methods_and_faults() {
        let value = to_foreign(&json!({
            "$type": "RoleBehaviour",
            "RoleName": "Sheriff",
            "$methods": { "GetRoleName": "Sheriff" },
            "$faults": ["Broken"]
        }))
        .unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.type_name(), "RoleBehaviour");
        assert_eq!(obj.member("RoleName").and_then(|v| v.as_text().map(String::from)), Some("Sheriff".into()));
        assert!(obj.has_method("GetRoleName"));
        assert!(obj.invoke("Broken", &[]).is_err());
    }

    #[test]
    fn malformed_pairs_are_rejected() {
        let err = to_foreign(&json!({ "$entries": [[1]] })).unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid(_)));
        let err = to_foreign(&json!({ "$bogus": 1 })).unwrap_err();
        assert!(err.to_string().contains("$bogus"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load(Path::new("/nonexistent/snapshot.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Read { .. }));
    }
}
