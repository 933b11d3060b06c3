//! WSI Snapshot: simulation payload to before/after state snapshots
//!
//! Simulation results arrive from the local CLI (JSON on stdout) or from an
//! RPC response, and the two disagree on field names. The extractor searches
//! the payload for a known alias, falls back to a per-record changes list, and
//! finally to an empty snapshot. It never fails.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use wsi_snapshot::capture_snapshots;
//!
//! let pair = capture_snapshots(&json!({
//!     "stateBefore": { "counter": 1 },
//!     "stateAfter": { "counter": 2 }
//! }));
//!
//! assert_eq!(pair.before.entries[0].value, json!(1));
//! assert_eq!(pair.after.entries[0].value, json!(2));
//! ```

pub mod aliases;
pub mod extractor;
pub mod normalize;

pub use aliases::AliasSet;
pub use extractor::{ExtractorConfig, Phase, SnapshotExtractor, SnapshotPair};
pub use normalize::{normalize_entries, project_changes};

use serde_json::Value;
use wsi_core::StateSnapshot;

/// Capture the before-state with the default extractor
pub fn capture_before_state(payload: &Value) -> StateSnapshot {
    SnapshotExtractor::default().capture_before_state(payload)
}

/// Capture the after-state with the default extractor
pub fn capture_after_state(payload: &Value) -> StateSnapshot {
    SnapshotExtractor::default().capture_after_state(payload)
}

/// Capture both phases with the default extractor
pub fn capture_snapshots(payload: &Value) -> SnapshotPair {
    SnapshotExtractor::default().capture_snapshots(payload)
}
