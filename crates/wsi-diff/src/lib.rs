//! WSI Diff: deterministic state diffs
//!
//! Compares a before/after snapshot pair, categorizes every key as created,
//! modified, deleted or unchanged, and exports the result as JSON. Object
//! values are compared in canonical form, so key order inside a value never
//! shows up as a change.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use wsi_core::{StateSnapshot, StateSnapshotEntry};
//! use wsi_diff::calculate_diff;
//!
//! let before = StateSnapshot::new("before", vec![StateSnapshotEntry::new("a", json!(1))]);
//! let after = StateSnapshot::new("after", vec![StateSnapshotEntry::new("a", json!(2))]);
//!
//! let diff = calculate_diff(&before, &after);
//! assert_eq!(diff.summary.modified, 1);
//! ```

pub mod engine;
pub mod export;
pub mod history;

pub use engine::calculate_diff;
pub use export::{export_state_diff, export_state_diff_at, ExportOptions};
pub use history::{effect_fingerprint, HistoryStats, SimulationHistory, SimulationRecord, DEFAULT_MAX_RECORDS};
