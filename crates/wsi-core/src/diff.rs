//! Diff types shared by the diff engine, history and host bindings
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::snapshot::{StateSnapshot, StateSnapshotEntry};

/// Category of a single state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Created,
    Modified,
    Deleted,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChangeType::Created => write!(f, "created"),
            ChangeType::Modified => write!(f, "modified"),
            ChangeType::Deleted => write!(f, "deleted"),
        }
    }
}

/// One created, modified or deleted key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDiffChange {
    #[serde(rename = "type")]
    pub change_type: ChangeType,

    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_entry: Option<StateSnapshotEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_entry: Option<StateSnapshotEntry>,
}

impl StateDiffChange {
    pub fn created(after: &StateSnapshotEntry) -> Self {
        Self {
            change_type: ChangeType::Created,
            key: after.key.clone(),
            contract_id: after.contract_id.clone(),
            before_value: None,
            after_value: Some(after.value.clone()),
            before_entry: None,
            after_entry: Some(after.clone()),
        }
    }

    pub fn deleted(before: &StateSnapshotEntry) -> Self {
        Self {
            change_type: ChangeType::Deleted,
            key: before.key.clone(),
            contract_id: before.contract_id.clone(),
            before_value: Some(before.value.clone()),
            after_value: None,
            before_entry: Some(before.clone()),
            after_entry: None,
        }
    }

    pub fn modified(before: &StateSnapshotEntry, after: &StateSnapshotEntry) -> Self {
        Self {
            change_type: ChangeType::Modified,
            key: after.key.clone(),
            contract_id: after.contract_id.clone().or_else(|| before.contract_id.clone()),
            before_value: Some(before.value.clone()),
            after_value: Some(after.value.clone()),
            before_entry: Some(before.clone()),
            after_entry: Some(after.clone()),
        }
    }
}

/// Per-category counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDiffSummary {
    pub total_entries_before: usize,
    pub total_entries_after: usize,
    pub created: usize,
    pub modified: usize,
    pub deleted: usize,
    pub unchanged: usize,
    pub total_changes: usize,
}

/// Categorized differences between two snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDiff {
    pub before: StateSnapshot,
    pub after: StateSnapshot,
    pub created: Vec<StateDiffChange>,
    pub modified: Vec<StateDiffChange>,
    pub deleted: Vec<StateDiffChange>,
    pub unchanged_keys: Vec<String>,
    pub summary: StateDiffSummary,
    pub has_changes: bool,
}

impl StateDiff {
    /// All changes in category order: created, modified, deleted
    pub fn changes(&self) -> impl Iterator<Item = &StateDiffChange> {
        self.created
            .iter()
            .chain(self.modified.iter())
            .chain(self.deleted.iter())
    }

    /// Changes touching one contract
    pub fn changes_for_contract<'a>(
        &'a self,
        contract_id: &'a str,
    ) -> impl Iterator<Item = &'a StateDiffChange> + 'a {
        self.changes()
            .filter(move |c| c.contract_id.as_deref() == Some(contract_id))
    }
}

impl fmt::Display for StateDiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} created, {} modified, {} deleted, {} unchanged ({} -> {} entries)",
            self.created,
            self.modified,
            self.deleted,
            self.unchanged,
            self.total_entries_before,
            self.total_entries_after
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_change_serializes_type_tag() {
        let entry = StateSnapshotEntry::new("k", json!(1));
        let change = StateDiffChange::created(&entry);
        let json = serde_json::to_value(&change).unwrap();

        assert_eq!(json["type"], json!("created"));
        assert_eq!(json["afterValue"], json!(1));
        assert!(json.get("beforeValue").is_none());
    }

    #[test]
    fn test_modified_keeps_contract_from_either_side() {
        let before = StateSnapshotEntry::new("k", json!(1)).with_contract("CA");
        let after = StateSnapshotEntry::new("k", json!(2));
        let change = StateDiffChange::modified(&before, &after);
        assert_eq!(change.contract_id.as_deref(), Some("CA"));
        assert_eq!(change.before_value, Some(json!(1)));
        assert_eq!(change.after_value, Some(json!(2)));
    }

    #[test]
    fn test_summary_display() {
        let summary = StateDiffSummary {
            total_entries_before: 3,
            total_entries_after: 3,
            created: 1,
            modified: 1,
            deleted: 1,
            unchanged: 1,
            total_changes: 3,
        };
        assert_eq!(
            summary.to_string(),
            "1 created, 1 modified, 1 deleted, 1 unchanged (3 -> 3 entries)"
        );
    }
}
