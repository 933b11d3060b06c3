//! Per-call validation options
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidateOptions {
    /// Apply safe repairs in place (refused when a CRITICAL issue exists)
    pub auto_repair: bool,

    /// Run the cross-record pass (duplicate contract ids)
    pub check_relationships: bool,

    /// Run the corruption pass
    pub detect_corruption: bool,

    /// Log each issue at info instead of debug
    pub log_verbose: bool,

    /// Fixed "now" for timestamp checks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_time: Option<DateTime<Utc>>,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            auto_repair: false,
            check_relationships: true,
            detect_corruption: true,
            log_verbose: false,
            reference_time: None,
        }
    }
}

impl ValidateOptions {
    pub fn with_repair(mut self) -> Self {
        self.auto_repair = true;
        self
    }

    pub fn at(mut self, reference_time: DateTime<Utc>) -> Self {
        self.reference_time = Some(reference_time);
        self
    }

    pub fn verbose(mut self) -> Self {
        self.log_verbose = true;
        self
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }
}
