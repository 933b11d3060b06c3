//! State snapshots: normalized point-in-time views of contract storage
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::canonical::fingerprint;

/// One key/value pair of captured state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshotEntry {
    /// Stable identifier within a snapshot
    pub key: String,

    pub value: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,

    /// Residual properties not claimed by the other fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl StateSnapshotEntry {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
            contract_id: None,
            metadata: None,
        }
    }

    pub fn with_contract(mut self, contract_id: impl Into<String>) -> Self {
        self.contract_id = Some(contract_id.into());
        self
    }

    /// Attach metadata; an empty map leaves the entry without metadata
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = if metadata.is_empty() { None } else { Some(metadata) };
        self
    }
}

/// Ordered list of entries plus provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub captured_at: DateTime<Utc>,

    /// Free-text provenance label (e.g. "before:stateBefore")
    pub source: String,

    pub entries: Vec<StateSnapshotEntry>,
}

impl StateSnapshot {
    /// Snapshot captured now
    pub fn new(source: impl Into<String>, entries: Vec<StateSnapshotEntry>) -> Self {
        Self {
            captured_at: Utc::now(),
            source: source.into(),
            entries,
        }
    }

    pub fn empty(source: impl Into<String>) -> Self {
        Self::new(source, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `key`. When a key repeats, the last occurrence wins, matching
    /// how the diff engine indexes entries.
    pub fn get(&self, key: &str) -> Option<&StateSnapshotEntry> {
        self.entries.iter().rev().find(|e| e.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// Content fingerprint of the entry list, independent of capture time
    pub fn fingerprint(&self) -> String {
        let entries = serde_json::to_value(&self.entries).unwrap_or_default();
        fingerprint(&entries)
    }
}
