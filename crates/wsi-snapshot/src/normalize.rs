//! Entry normalization
//!
//! Turns whatever raw value the extractor found into a flat entry list.

use serde_json::{Map, Value};
use wsi_core::StateSnapshotEntry;

use crate::aliases::{CONTRACT_ID, ENTRIES, KEY, VALUE};
use crate::Phase;

/// Bound on nested `entries` wrappers
const MAX_EMBED_DEPTH: usize = 8;

/// Normalize a raw state value into entries.
///
/// - array: one entry per usable element
/// - object wrapping an entries collection: that collection
/// - object shaped like a single entry: one entry
/// - any other object: one entry per property
/// - scalars: nothing
pub fn normalize_entries(raw: &Value) -> Vec<StateSnapshotEntry> {
    normalize_at(raw, 0)
}

fn normalize_at(raw: &Value, depth: usize) -> Vec<StateSnapshotEntry> {
    match raw {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| normalize_element(item, index))
            .collect(),
        Value::Object(map) => {
            if depth < MAX_EMBED_DEPTH {
                if let Some((_, embedded)) = ENTRIES.lookup_container(map) {
                    return normalize_at(embedded, depth + 1);
                }
            }

            if looks_like_entry(map) {
                return vec![entry_from_object(map, "entry_0".to_string())];
            }

            map.iter()
                .map(|(key, value)| StateSnapshotEntry::new(key.clone(), value.clone()))
                .collect()
        }
        _ => Vec::new(),
    }
}

fn looks_like_entry(map: &Map<String, Value>) -> bool {
    KEY.lookup_scalar(map).is_some() && VALUE.lookup(map).is_some()
}

/// Normalize one array element; `null` and `{}` carry no data and are dropped
fn normalize_element(item: &Value, index: usize) -> Option<StateSnapshotEntry> {
    let fallback = format!("entry_{}", index);
    match item {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        Value::Object(map) => Some(entry_from_object(map, fallback)),
        scalar => Some(StateSnapshotEntry::new(fallback, scalar.clone())),
    }
}

fn entry_from_object(map: &Map<String, Value>, fallback_key: String) -> StateSnapshotEntry {
    let mut consumed: Vec<&str> = Vec::with_capacity(3);

    let key = match KEY.lookup_scalar(map) {
        Some((alias, key)) => {
            consumed.push(alias);
            key
        }
        None => fallback_key,
    };

    let contract_id = CONTRACT_ID.lookup_scalar(map).map(|(alias, id)| {
        consumed.push(alias);
        id
    });

    let entry = match VALUE.lookup(map) {
        Some((alias, value)) => {
            consumed.push(alias);
            let metadata: Map<String, Value> = map
                .iter()
                .filter(|(k, _)| !consumed.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            StateSnapshotEntry::new(key, value.clone()).with_metadata(metadata)
        }
        // No value field: the whole record is the value
        None => StateSnapshotEntry::new(key, Value::Object(map.clone())),
    };

    match contract_id {
        Some(id) => entry.with_contract(id),
        None => entry,
    }
}

/// Project a changes collection onto one phase.
///
/// Records without a value for the phase are skipped. An object collection is
/// read as `key -> record`, the property name serving as the default key.
pub fn project_changes(raw: &Value, phase: Phase) -> Vec<StateSnapshotEntry> {
    let records: Vec<(String, &Map<String, Value>)> = match raw {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| item.as_object().map(|r| (format!("entry_{}", index), r)))
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(key, item)| item.as_object().map(|r| (key.clone(), r)))
            .collect(),
        _ => Vec::new(),
    };

    let field = phase.change_field();
    let mut entries = Vec::with_capacity(records.len());

    for (fallback, record) in records {
        let Some(value) = record.get(field).filter(|v| !v.is_null()) else {
            continue;
        };

        let key = KEY
            .lookup_scalar(record)
            .map(|(_, key)| key)
            .unwrap_or(fallback);

        let mut entry = StateSnapshotEntry::new(key, value.clone());
        if let Some((_, id)) = CONTRACT_ID.lookup_scalar(record) {
            entry = entry.with_contract(id);
        }
        entries.push(entry);
    }

    entries
}
