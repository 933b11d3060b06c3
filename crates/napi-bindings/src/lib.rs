use napi::bindgen_prelude::*;
use tracing_subscriber::EnvFilter;

#[macro_use]
extern crate napi_derive;

pub mod diff_api;
pub mod integrity_api;
pub mod snapshot_api;

const DEFAULT_LOG_FILTER: &str = "wsi=info";

pub(crate) fn js_error(err: impl std::fmt::Display) -> Error {
    Error::from_reason(err.to_string())
}

pub(crate) fn parse_json(label: &str, text: &str) -> Result<serde_json::Value> {
    serde_json::from_str(text).map_err(|e| Error::from_reason(format!("Invalid {} JSON: {}", label, e)))
}

#[napi]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Install a stderr log subscriber. Returns false when one is already installed.
#[napi]
pub fn init_logging(filter: Option<String>) -> Result<bool> {
    let filter = EnvFilter::try_new(filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)).map_err(js_error)?;
    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok())
}
