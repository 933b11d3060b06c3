//! Unified Error Model
//!
//! Validation and extraction report problems as data. Only the conveniences
//! around them (export, report rendering, profile loading, typed conversion)
//! can fail, and they fail with this type.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WsiError {
    #[error("SERIALIZE/{0}")]
    SerializeError(String),

    #[error("CONFIG/{0}")]
    ConfigError(String),

    #[error("RENDER/{0}")]
    RenderError(String),

    #[error("SCHEMA/{0}")]
    SchemaError(String),
}

impl From<serde_json::Error> for WsiError {
    fn from(err: serde_json::Error) -> Self {
        WsiError::SerializeError(err.to_string())
    }
}
