//! NAPI bindings for snapshot extraction

use napi::bindgen_prelude::*;
use wsi_snapshot::{ExtractorConfig, SnapshotExtractor};

use crate::{js_error, parse_json};

/// Extract before/after snapshots from a simulation payload
#[napi]
pub fn capture_snapshots(payload_json: String, max_depth: Option<u32>) -> Result<String> {
    let payload = parse_json("payload", &payload_json)?;
    let extractor = match max_depth {
        Some(depth) => SnapshotExtractor::new(ExtractorConfig {
            max_depth: depth as usize,
        }),
        None => SnapshotExtractor::default(),
    };

    serde_json::to_string(&extractor.capture_snapshots(&payload)).map_err(js_error)
}
