//! Snapshot extraction strategy: direct alias, changes list, empty

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;
use wsi_core::{StateSnapshot, TreeWalker, DEFAULT_MAX_DEPTH};

use crate::aliases::{AliasSet, AFTER_STATE, BEFORE_STATE, CHANGES};
use crate::normalize::{normalize_entries, project_changes};

/// Which side of the simulation a snapshot describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Before,
    After,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Before => "before",
            Phase::After => "after",
        }
    }

    /// Aliases naming this phase's full state
    pub fn state_aliases(&self) -> &'static AliasSet {
        match self {
            Phase::Before => &BEFORE_STATE,
            Phase::After => &AFTER_STATE,
        }
    }

    /// Field carrying this phase's value inside a change record
    pub fn change_field(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractorConfig {
    /// How deep into the payload alias searches go
    pub max_depth: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Both snapshots of one simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPair {
    pub before: StateSnapshot,
    pub after: StateSnapshot,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotExtractor {
    walker: TreeWalker,
}

impl SnapshotExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            walker: TreeWalker::new(config.max_depth),
        }
    }

    pub fn capture_before_state(&self, payload: &Value) -> StateSnapshot {
        self.capture(payload, Phase::Before)
    }

    pub fn capture_after_state(&self, payload: &Value) -> StateSnapshot {
        self.capture(payload, Phase::After)
    }

    pub fn capture_snapshots(&self, payload: &Value) -> SnapshotPair {
        SnapshotPair {
            before: self.capture_before_state(payload),
            after: self.capture_after_state(payload),
        }
    }

    /// Capture one phase of a payload
    pub fn capture(&self, payload: &Value, phase: Phase) -> StateSnapshot {
        let aliases = phase.state_aliases();
        let direct = self.walker.find(payload, |key, value| {
            if value.is_null() {
                None
            } else {
                aliases.rank(key)
            }
        });

        if let Some(hit) = direct {
            let entries = normalize_entries(hit.value);
            debug!(
                phase = %phase,
                concept = aliases.name(),
                alias = hit.key,
                depth = hit.depth,
                entries = entries.len(),
                "state captured from direct alias"
            );
            return StateSnapshot::new(format!("{}:{}", phase, hit.key), entries);
        }

        let changes = self.walker.find(payload, |key, value| {
            if value.is_array() || value.is_object() {
                CHANGES.rank(key)
            } else {
                None
            }
        });

        if let Some(hit) = changes {
            let entries = project_changes(hit.value, phase);
            debug!(
                phase = %phase,
                concept = CHANGES.name(),
                alias = hit.key,
                depth = hit.depth,
                entries = entries.len(),
                "state captured from changes list"
            );
            return StateSnapshot::new(format!("{}:changes:{}", phase, hit.key), entries);
        }

        debug!(phase = %phase, "no state found in payload");
        StateSnapshot::empty(format!("{}:none", phase))
    }
}
