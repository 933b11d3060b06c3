//! NAPI bindings for workspace state validation

use napi::bindgen_prelude::*;
use wsi_core::ValidationResult;
use wsi_integrity::{format_result, IntegrityProfile, IntegrityValidator, ValidateOptions};

use crate::{js_error, parse_json};

/// Outcome of validating a persisted state
#[napi(object)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub severity: String,
    pub result_json: String,
    /// State after any repairs (identical to the input when none ran)
    pub state_json: String,
}

/// Validate (and optionally repair) a workspace state.
///
/// `profile_yaml` overrides the standard integrity profile.
#[napi]
pub fn validate_workspace_state(
    state_json: String,
    options_json: Option<String>,
    profile_yaml: Option<String>,
) -> Result<ValidationOutcome> {
    let mut state = parse_json("state", &state_json)?;
    let options: ValidateOptions = match options_json {
        Some(text) => serde_json::from_value(parse_json("options", &text)?).map_err(js_error)?,
        None => ValidateOptions::default(),
    };

    let result = match profile_yaml {
        Some(yaml) => {
            let profile = IntegrityProfile::from_yaml(&yaml).map_err(js_error)?;
            IntegrityValidator::new(profile)
                .map_err(js_error)?
                .validate(&mut state, &options)
        }
        None => wsi_integrity::validate(&mut state, &options),
    };

    Ok(ValidationOutcome {
        valid: result.valid,
        severity: result.severity.to_string(),
        result_json: serde_json::to_string(&result).map_err(js_error)?,
        state_json: serde_json::to_string(&state).map_err(js_error)?,
    })
}

/// Render a validation result JSON as a text report
#[napi]
pub fn format_validation_result(result_json: String) -> Result<String> {
    let result: ValidationResult =
        serde_json::from_value(parse_json("validation result", &result_json)?).map_err(js_error)?;
    format_result(&result).map_err(js_error)
}
