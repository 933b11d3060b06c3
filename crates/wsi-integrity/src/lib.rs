//! WSI Integrity: validation, corruption detection and safe auto-repair
//!
//! Persisted workspace state is validated in five passes:
//!
//! ```text
//! structure → data types → enums → relationships → corruption
//!                                   (gated)         (gated)
//! ```
//!
//! Every anomaly becomes a [`ValidationIssue`](wsi_core::ValidationIssue);
//! nothing here returns an error for bad state. Repairs are opt-in and are
//! refused outright while a CRITICAL issue exists.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use wsi_integrity::{validate, ValidateOptions};
//!
//! let mut state = json!({
//!     "deployments": {},
//!     "configurations": {},
//!     "lastSync": -5,
//!     "syncVersion": 1
//! });
//!
//! let result = validate(&mut state, &ValidateOptions::default().with_repair());
//! assert!(!result.valid);
//! assert!(result.repairs.is_empty());
//! ```

pub mod options;
pub mod passes;
pub mod profile;
pub mod repair;
pub mod report;
pub mod validator;

pub use options::ValidateOptions;
pub use profile::{IntegrityProfile, DEFAULT_CONTRACT_ID_PATTERN};
pub use repair::{
    default_strategies, DuplicateDeploymentRepair, InvalidEnumRepair, OrphanReferenceRepair,
    RepairStrategy,
};
pub use report::format_result;
pub use validator::IntegrityValidator;

use once_cell::sync::Lazy;
use serde_json::Value;
use wsi_core::ValidationResult;

static DEFAULT_VALIDATOR: Lazy<IntegrityValidator> = Lazy::new(IntegrityValidator::default);

/// Validate with the standard profile
pub fn validate(state: &mut Value, options: &ValidateOptions) -> ValidationResult {
    DEFAULT_VALIDATOR.validate(state, options)
}

/// Read-only validation with the standard profile
pub fn check(state: &Value, options: &ValidateOptions) -> ValidationResult {
    DEFAULT_VALIDATOR.check(state, options)
}
