//! Simulation history
//!
//! Keeps the most recent simulation records in memory. Each record embeds the
//! diff it produced and a fingerprint of its state effect, so two simulations
//! that change state identically can be recognized regardless of when they ran.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;
use wsi_core::{fingerprint, StateDiff, StateSnapshot, WsiError};
use wsi_snapshot::SnapshotExtractor;

use crate::engine::calculate_diff;

/// Default number of records kept
pub const DEFAULT_MAX_RECORDS: usize = 100;

/// One simulation and its effect on state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRecord {
    pub id: String,

    pub recorded_at: DateTime<Utc>,

    /// Caller-chosen description (usually the invoked function)
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,

    pub diff: StateDiff,

    /// `blake3:<hex>` digest of the categorized changes
    pub fingerprint: String,
}

impl SimulationRecord {
    /// Extract both snapshots from a simulation payload and diff them
    pub fn capture(label: impl Into<String>, payload: &Value, extractor: &SnapshotExtractor) -> Self {
        let pair = extractor.capture_snapshots(payload);
        Self::from_snapshots(label, &pair.before, &pair.after)
    }

    pub fn from_snapshots(label: impl Into<String>, before: &StateSnapshot, after: &StateSnapshot) -> Self {
        Self::from_diff(label, calculate_diff(before, after))
    }

    pub fn from_diff(label: impl Into<String>, diff: StateDiff) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            recorded_at: Utc::now(),
            label: label.into(),
            contract_id: None,
            fingerprint: effect_fingerprint(&diff),
            diff,
        }
    }

    pub fn with_contract(mut self, contract_id: impl Into<String>) -> Self {
        self.contract_id = Some(contract_id.into());
        self
    }

    pub fn has_changes(&self) -> bool {
        self.diff.has_changes
    }

    /// Whether this record touched `contract_id`, directly or through a change
    pub fn touches(&self, contract_id: &str) -> bool {
        self.contract_id.as_deref() == Some(contract_id)
            || self.diff.changes_for_contract(contract_id).next().is_some()
    }
}

/// Fingerprint of a diff's state effect. Snapshot timestamps and sources are
/// not part of it.
pub fn effect_fingerprint(diff: &StateDiff) -> String {
    let effect = json!({
        "created": serde_json::to_value(&diff.created).unwrap_or_default(),
        "modified": serde_json::to_value(&diff.modified).unwrap_or_default(),
        "deleted": serde_json::to_value(&diff.deleted).unwrap_or_default(),
    });
    fingerprint(&effect)
}

/// Bounded, oldest-first list of simulation records
#[derive(Debug, Clone)]
pub struct SimulationHistory {
    records: Vec<SimulationRecord>,
    max_records: usize,
}

impl SimulationHistory {
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_RECORDS)
    }

    pub fn with_max_entries(max: usize) -> Self {
        Self {
            records: Vec::new(),
            max_records: max,
        }
    }

    /// Append a record, dropping the oldest beyond the cap. Returns the record id.
    pub fn record(&mut self, record: SimulationRecord) -> String {
        let id = record.id.clone();
        debug!(
            id = %id,
            label = %record.label,
            changes = record.diff.summary.total_changes,
            "simulation recorded"
        );
        self.records.push(record);

        if self.records.len() > self.max_records {
            let drain_count = self.records.len() - self.max_records;
            self.records.drain(0..drain_count);
            debug!(dropped = drain_count, "simulation history trimmed");
        }
        id
    }

    pub fn records(&self) -> &[SimulationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest(&self) -> Option<&SimulationRecord> {
        self.records.last()
    }

    pub fn find(&self, id: &str) -> Option<&SimulationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn for_contract(&self, contract_id: &str) -> Vec<&SimulationRecord> {
        self.records.iter().filter(|r| r.touches(contract_id)).collect()
    }

    /// Records whose state effect matches `fingerprint`
    pub fn with_fingerprint(&self, fingerprint: &str) -> Vec<&SimulationRecord> {
        self.records
            .iter()
            .filter(|r| r.fingerprint == fingerprint)
            .collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn to_json(&self) -> Result<String, WsiError> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    /// One record per line
    pub fn to_jsonl(&self) -> String {
        self.records
            .iter()
            .filter_map(|r| serde_json::to_string(r).ok())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn stats(&self) -> HistoryStats {
        let mut stats = HistoryStats {
            total: self.records.len(),
            ..HistoryStats::default()
        };
        for record in &self.records {
            let summary = &record.diff.summary;
            if record.has_changes() {
                stats.with_changes += 1;
            }
            stats.total_changes += summary.total_changes;
            stats.created += summary.created;
            stats.modified += summary.modified;
            stats.deleted += summary.deleted;
        }
        stats
    }
}

impl Default for SimulationHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate counts over the history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total: usize,
    pub with_changes: usize,
    pub total_changes: usize,
    pub created: usize,
    pub modified: usize,
    pub deleted: usize,
}
