//! NAPI bindings for state diffs

use napi::bindgen_prelude::*;
use wsi_core::{StateDiff, StateSnapshot};
use wsi_diff::{calculate_diff, ExportOptions};

use crate::{js_error, parse_json};

/// Diff two snapshots given as JSON
#[napi]
pub fn calculate_state_diff(before_json: String, after_json: String) -> Result<String> {
    let before: StateSnapshot =
        serde_json::from_value(parse_json("before snapshot", &before_json)?).map_err(js_error)?;
    let after: StateSnapshot =
        serde_json::from_value(parse_json("after snapshot", &after_json)?).map_err(js_error)?;

    serde_json::to_string(&calculate_diff(&before, &after)).map_err(js_error)
}

/// Serialize a diff for export; options follow `{ includeSnapshots, pretty }`
#[napi]
pub fn export_state_diff(diff_json: String, options_json: Option<String>) -> Result<String> {
    let diff: StateDiff = serde_json::from_value(parse_json("diff", &diff_json)?).map_err(js_error)?;
    let options: ExportOptions = match options_json {
        Some(text) => serde_json::from_value(parse_json("options", &text)?).map_err(js_error)?,
        None => ExportOptions::default(),
    };

    wsi_diff::export_state_diff(&diff, &options).map_err(js_error)
}
