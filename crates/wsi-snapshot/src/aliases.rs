//! Ordered field-name candidates per concept
//!
//! The local CLI and the RPC endpoint name the same things differently. Each
//! concept gets one `AliasSet`; earlier aliases take priority.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasSet {
    name: &'static str,
    aliases: &'static [&'static str],
}

impl AliasSet {
    pub const fn new(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { name, aliases }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Priority of `key` within the set
    pub fn rank(&self, key: &str) -> Option<usize> {
        self.aliases.iter().position(|alias| *alias == key)
    }

    /// First alias present in `map`, in priority order
    pub fn lookup<'a>(&self, map: &'a Map<String, Value>) -> Option<(&'static str, &'a Value)> {
        self.aliases
            .iter()
            .find_map(|alias| map.get(*alias).map(|value| (*alias, value)))
    }

    /// First alias holding an array or object, skipping aliases bound to scalars
    pub fn lookup_container<'a>(&self, map: &'a Map<String, Value>) -> Option<(&'static str, &'a Value)> {
        self.aliases.iter().find_map(|alias| match map.get(*alias) {
            Some(value) if value.is_array() || value.is_object() => Some((*alias, value)),
            _ => None,
        })
    }

    /// First alias holding a usable identifier: a non-empty string or a number
    pub fn lookup_scalar(&self, map: &Map<String, Value>) -> Option<(&'static str, String)> {
        self.aliases.iter().find_map(|alias| match map.get(*alias) {
            Some(Value::String(s)) if !s.is_empty() => Some((*alias, s.clone())),
            Some(Value::Number(n)) => Some((*alias, n.to_string())),
            _ => None,
        })
    }
}

pub const BEFORE_STATE: AliasSet = AliasSet::new(
    "before-state",
    &["stateBefore", "beforeState", "preState", "storageBefore", "ledgerBefore"],
);

pub const AFTER_STATE: AliasSet = AliasSet::new(
    "after-state",
    &["stateAfter", "afterState", "postState", "storageAfter", "ledgerAfter"],
);

pub const CHANGES: AliasSet = AliasSet::new(
    "changes",
    &["stateChanges", "storageChanges", "changes", "modifiedEntries"],
);

pub const ENTRIES: AliasSet = AliasSet::new(
    "entries",
    &["entries", "storageEntries", "ledgerEntries", "items", "records"],
);

pub const KEY: AliasSet = AliasSet::new("key", &["key", "storageKey", "ledgerKey", "id", "name"]);

pub const VALUE: AliasSet = AliasSet::new(
    "value",
    &["value", "val", "data", "entry", "bytes", "current"],
);

pub const CONTRACT_ID: AliasSet = AliasSet::new("contract-id", &["contractId", "contract", "address"]);
