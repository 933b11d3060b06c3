//! WSI Core: shared data model for the workspace state integrity engine
//!
//! Snapshots, diffs and validation results are plain serializable data so the
//! host tool can persist or export them untouched. The helpers in this crate
//! (canonicalizer, type guards, tree walker) are pure and never panic on
//! untrusted input.
//!
//! ```text
//! payload ─▶ wsi-snapshot ─▶ StateSnapshot ×2 ─▶ wsi-diff ─▶ StateDiff
//! persisted state ─▶ wsi-integrity ─▶ ValidationResult
//! ```

pub mod canonical;
pub mod diff;
pub mod error;
pub mod guards;
pub mod snapshot;
pub mod validation;
pub mod walker;
pub mod workspace;

pub use canonical::{canonical_eq, canonicalize, fingerprint, CanonicalError, MAX_CANONICAL_DEPTH};
pub use diff::{ChangeType, StateDiff, StateDiffChange, StateDiffSummary};
pub use error::WsiError;
pub use snapshot::{StateSnapshot, StateSnapshotEntry};
pub use validation::{
    IssueCode, RepairAction, RepairKind, Severity, ValidationIssue, ValidationResult,
    ValidationSummary,
};
pub use walker::{Hit, TreeWalker, DEFAULT_MAX_DEPTH};
pub use workspace::{DeploymentRecord, Network, WorkspaceState};
