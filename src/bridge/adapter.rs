//! bridge::adapter
//!
//! Converts foreign collections of unknown concrete type into local
//! sequences and maps.
//!
//! # Strategy
//!
//! Sequences, in order of preference:
//! 1. Generic iteration ([`ForeignObject::items`]), skipping null elements.
//! 2. A `Count` member plus an indexer method (`get_Item`, else `Get`),
//!    iterating `0..Count` and skipping null elements. An element whose
//!    indexer call fails is skipped; the rest of the collection is kept.
//!
//! Key/value entries, in order of preference:
//! 1. Dictionary iteration ([`ForeignObject::entries`]).
//! 2. A sequence (as above) of pair objects exposing `Key` and `Value`.
//!
//! Entries with a null value are skipped. Maps are built from entries with
//! last-write-wins on duplicate keys.
//!
//! Nothing in this module fails past its boundary: when no strategy
//! applies, the result is empty and the failure is logged.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::traits::{BindingError, ForeignObject, ForeignValue};

/// Indexer method names probed when generic iteration is unavailable.
const INDEXER_METHODS: [&str; 2] = ["get_Item", "Get"];

/// Convert a foreign collection into an ordered sequence of non-null values.
///
/// Returns an empty sequence if the value is not a collection.
pub fn to_sequence(value: &ForeignValue) -> Vec<ForeignValue> {
    match try_sequence(value) {
        Ok(items) => items,
        Err(e) => {
            warn!(kind = value.kind(), error = %e, "could not convert foreign collection");
            Vec::new()
        }
    }
}

/// Convert a foreign collection, reporting why it could not be converted.
pub fn try_sequence(value: &ForeignValue) -> Result<Vec<ForeignValue>, BindingError> {
    let obj = value
        .as_object()
        .ok_or_else(|| BindingError::NotACollection(value.kind().to_string()))?;

    if let Some(items) = obj.items() {
        return Ok(items.into_iter().filter(|v| !v.is_null()).collect());
    }

    by_index(&**obj)
}

/// Iterate an indexer-only collection.
fn by_index(obj: &dyn ForeignObject) -> Result<Vec<ForeignValue>, BindingError> {
    let count = obj
        .member("Count")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| BindingError::NotACollection(obj.type_name().to_string()))?;

    let indexer = INDEXER_METHODS
        .iter()
        .copied()
        .find(|m| obj.has_method(m))
        .ok_or_else(|| BindingError::NotACollection(obj.type_name().to_string()))?;

    debug!(
        type_name = obj.type_name(),
        count, indexer, "iterating collection by index"
    );

    let mut result = Vec::new();
    for i in 0..count.max(0) {
        match obj.invoke(indexer, &[ForeignValue::Int(i)]) {
            Ok(item) if !item.is_null() => result.push(item),
            Ok(_) => {}
            Err(e) => warn!(
                type_name = obj.type_name(),
                index = i,
                error = %e,
                "skipping unreadable collection element"
            ),
        }
    }
    Ok(result)
}

/// Convert a foreign dictionary or pair list into ordered key/value entries.
///
/// Duplicate keys are preserved in iteration order; use [`to_map`] for
/// last-write-wins semantics.
pub fn to_entries(value: &ForeignValue) -> Vec<(ForeignValue, ForeignValue)> {
    let Some(obj) = value.as_object() else {
        warn!(kind = value.kind(), "foreign map is not an object");
        return Vec::new();
    };

    if let Some(entries) = obj.entries() {
        return entries.into_iter().filter(|(_, v)| !v.is_null()).collect();
    }

    let pairs = match try_sequence(value) {
        Ok(pairs) => pairs,
        Err(e) => {
            warn!(kind = value.kind(), error = %e, "could not convert foreign map");
            return Vec::new();
        }
    };

    pairs
        .iter()
        .filter_map(|pair| {
            let Some(pair_obj) = pair.as_object() else {
                debug!(kind = pair.kind(), "skipping non-object map entry");
                return None;
            };
            match (pair_obj.member("Key"), pair_obj.member("Value")) {
                (Some(k), Some(v)) if !v.is_null() => Some((k, v)),
                (Some(_), Some(_)) => None,
                _ => {
                    warn!(
                        type_name = pair_obj.type_name(),
                        "map entry has no Key or Value member"
                    );
                    None
                }
            }
        })
        .collect()
}

/// Convert a foreign map into a local map, converting keys with `key`.
///
/// Entries whose key cannot be converted are dropped. Duplicate keys
/// overwrite earlier ones (last write wins).
pub fn to_map<K, F>(value: &ForeignValue, mut key: F) -> BTreeMap<K, ForeignValue>
where
    K: Ord,
    F: FnMut(&ForeignValue) -> Option<K>,
{
    let mut result = BTreeMap::new();
    for (k, v) in to_entries(value) {
        match key(&k) {
            Some(converted) => {
                result.insert(converted, v);
            }
            None => debug!(kind = k.kind(), "dropping map entry with unusable key"),
        }
    }
    result
}
