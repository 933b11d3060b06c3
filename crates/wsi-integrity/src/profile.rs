//! Integrity profiles
//!
//! The thresholds the validator checks against. The standard profile matches
//! the protocol the engine ships with; hosts can load their own from YAML.

use serde::{Deserialize, Serialize};
use wsi_core::guards::TimestampWindow;
use wsi_core::{Network, WsiError};

/// Identifier format of deployed contracts
pub const DEFAULT_CONTRACT_ID_PATTERN: &str = "^C[A-Z0-9]{55}$";

/// Thresholds and defaults for validation and repair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityProfile {
    /// Profile name (e.g., "standard@1.0")
    pub name: String,

    /// Highest `syncVersion` this engine understands
    pub current_protocol_version: u64,

    /// Timestamps older than this many years are implausible
    pub corruption_window_years: u32,

    /// Network written over out-of-enum values during repair
    pub default_network: Network,

    /// Regex every `contractId` is expected to match
    pub contract_id_pattern: String,

    /// Future skew the corruption pass accepts on `lastSync`
    pub future_tolerance_ms: u64,
}

impl IntegrityProfile {
    pub fn standard() -> Self {
        Self {
            name: "standard@1.0".to_string(),
            current_protocol_version: 1,
            corruption_window_years: 100,
            default_network: Network::Testnet,
            contract_id_pattern: DEFAULT_CONTRACT_ID_PATTERN.to_string(),
            future_tolerance_ms: 0,
        }
    }

    /// Load profile from YAML; omitted fields keep their standard values
    pub fn from_yaml(yaml: &str) -> Result<Self, WsiError> {
        serde_yaml::from_str(yaml).map_err(|e| WsiError::ConfigError(e.to_string()))
    }

    /// Window for the data-type pass: future values are tolerated
    pub fn lenient_window(&self, now_ms: f64) -> TimestampWindow {
        TimestampWindow::new(now_ms, self.corruption_window_years as f64)
    }

    /// Window for the corruption pass: future values count against the tolerance
    pub fn strict_window(&self, now_ms: f64) -> TimestampWindow {
        self.lenient_window(now_ms)
            .bounded_future(self.future_tolerance_ms as f64)
    }
}

impl Default for IntegrityProfile {
    fn default() -> Self {
        Self::standard()
    }
}
