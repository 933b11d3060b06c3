//! Diff export
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wsi_core::{StateDiff, StateDiffChange, StateDiffSummary, StateSnapshot, WsiError};

/// Export settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    /// Embed the full before/after snapshots
    pub include_snapshots: bool,
    /// Indent the output
    pub pretty: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_snapshots: false,
            pretty: true,
        }
    }
}

impl ExportOptions {
    pub fn with_snapshots(mut self) -> Self {
        self.include_snapshots = true;
        self
    }

    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiffExport<'a> {
    exported_at: DateTime<Utc>,
    summary: &'a StateDiffSummary,
    has_changes: bool,
    changes: ExportedChanges<'a>,
    unchanged_keys: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshots: Option<ExportedSnapshots<'a>>,
}

#[derive(Serialize)]
struct ExportedChanges<'a> {
    created: &'a [StateDiffChange],
    modified: &'a [StateDiffChange],
    deleted: &'a [StateDiffChange],
}

#[derive(Serialize)]
struct ExportedSnapshots<'a> {
    before: &'a StateSnapshot,
    after: &'a StateSnapshot,
}

/// Serialize a diff for sharing or archiving
pub fn export_state_diff(diff: &StateDiff, options: &ExportOptions) -> Result<String, WsiError> {
    export_state_diff_at(diff, options, Utc::now())
}

/// Same as [`export_state_diff`] with an explicit export timestamp
pub fn export_state_diff_at(
    diff: &StateDiff,
    options: &ExportOptions,
    exported_at: DateTime<Utc>,
) -> Result<String, WsiError> {
    let export = DiffExport {
        exported_at,
        summary: &diff.summary,
        has_changes: diff.has_changes,
        changes: ExportedChanges {
            created: &diff.created,
            modified: &diff.modified,
            deleted: &diff.deleted,
        },
        unchanged_keys: &diff.unchanged_keys,
        snapshots: options.include_snapshots.then(|| ExportedSnapshots {
            before: &diff.before,
            after: &diff.after,
        }),
    };

    let text = if options.pretty {
        serde_json::to_string_pretty(&export)?
    } else {
        serde_json::to_string(&export)?
    };
    Ok(text)
}
