//! Snapshot comparison
//!
//! Entries are indexed by key and the key union is walked in sorted order, so
//! the diff does not depend on the order entries were captured in.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use wsi_core::{canonical_eq, StateDiff, StateDiffChange, StateDiffSummary, StateSnapshot, StateSnapshotEntry};

/// Compare two snapshots
pub fn calculate_diff(before: &StateSnapshot, after: &StateSnapshot) -> StateDiff {
    let before_index = index_entries(before);
    let after_index = index_entries(after);

    let keys: BTreeSet<&str> = before_index
        .keys()
        .chain(after_index.keys())
        .copied()
        .collect();

    let mut created = Vec::new();
    let mut modified = Vec::new();
    let mut deleted = Vec::new();
    let mut unchanged_keys = Vec::new();

    for key in keys {
        match (before_index.get(key), after_index.get(key)) {
            (None, Some(after_entry)) => created.push(StateDiffChange::created(after_entry)),
            (Some(before_entry), None) => deleted.push(StateDiffChange::deleted(before_entry)),
            (Some(before_entry), Some(after_entry)) => {
                if canonical_eq(&before_entry.value, &after_entry.value) {
                    unchanged_keys.push(key.to_string());
                } else {
                    modified.push(StateDiffChange::modified(before_entry, after_entry));
                }
            }
            (None, None) => {}
        }
    }

    let total_changes = created.len() + modified.len() + deleted.len();
    let summary = StateDiffSummary {
        total_entries_before: before.len(),
        total_entries_after: after.len(),
        created: created.len(),
        modified: modified.len(),
        deleted: deleted.len(),
        unchanged: unchanged_keys.len(),
        total_changes,
    };

    debug!(%summary, "state diff calculated");

    StateDiff {
        before: before.clone(),
        after: after.clone(),
        created,
        modified,
        deleted,
        unchanged_keys,
        summary,
        has_changes: total_changes > 0,
    }
}

/// Key index where a repeated key keeps its last entry
fn index_entries(snapshot: &StateSnapshot) -> BTreeMap<&str, &StateSnapshotEntry> {
    let mut index = BTreeMap::new();
    for entry in &snapshot.entries {
        index.insert(entry.key.as_str(), entry);
    }
    index
}
