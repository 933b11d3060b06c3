//! Typed view of the persisted workspace aggregate
//!
//! The validator works on raw JSON because persisted state cannot be trusted
//! to match this shape. Once a state validates, collaborators convert it with
//! [`WorkspaceState::from_value`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::WsiError;

/// Networks a contract can be deployed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Public,
    Testnet,
    Futurenet,
    Local,
}

impl Network {
    pub const ALL: [Network; 4] = [
        Network::Public,
        Network::Testnet,
        Network::Futurenet,
        Network::Local,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Public => "public",
            Network::Testnet => "testnet",
            Network::Futurenet => "futurenet",
            Network::Local => "local",
        }
    }

    /// Wire names of every network, in declaration order
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Network::as_str).collect()
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Testnet
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Network {
    type Err = WsiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::ALL
            .iter()
            .copied()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| WsiError::SchemaError(format!("unknown network '{}'", s)))
    }
}

/// Metadata for one published contract instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub contract_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_name: Option<String>,

    /// Date-like string as written by the deploy command
    pub deployed_at: String,

    pub network: Network,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl DeploymentRecord {
    pub fn new(contract_id: impl Into<String>, deployed_at: impl Into<String>, network: Network) -> Self {
        Self {
            contract_id: contract_id.into(),
            contract_name: None,
            deployed_at: deployed_at.into(),
            network,
            source: None,
            transaction_hash: None,
            metadata: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.contract_name = Some(name.into());
        self
    }

}

/// The long-lived aggregate persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceState {
    /// Keyed by slot in insertion order; keys are unique by construction
    pub deployments: IndexMap<String, DeploymentRecord>,

    pub configurations: Map<String, Value>,

    /// Epoch milliseconds of the last successful sync
    pub last_sync: i64,

    pub sync_version: u32,
}

impl WorkspaceState {
    /// Fresh state stamped with `last_sync`
    pub fn new(last_sync: i64, sync_version: u32) -> Self {
        Self {
            deployments: IndexMap::new(),
            configurations: Map::new(),
            last_sync,
            sync_version,
        }
    }

    pub fn from_value(value: &Value) -> Result<Self, WsiError> {
        serde_json::from_value(value.clone()).map_err(|e| WsiError::SchemaError(e.to_string()))
    }

    pub fn to_value(&self) -> Result<Value, WsiError> {
        serde_json::to_value(self).map_err(WsiError::from)
    }

    pub fn contract_ids(&self) -> impl Iterator<Item = &str> {
        self.deployments.values().map(|d| d.contract_id.as_str())
    }

    pub fn deployments_on(&self, network: Network) -> impl Iterator<Item = (&String, &DeploymentRecord)> {
        self.deployments.iter().filter(move |(_, d)| d.network == network)
    }
}

impl TryFrom<&Value> for WorkspaceState {
    type Error = WsiError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_network_parse() {
        assert_eq!("testnet".parse::<Network>().unwrap(), Network::Testnet);
        assert_eq!("local".parse::<Network>().unwrap(), Network::Local);
        assert!("mainnet".parse::<Network>().is_err());
        assert!("Testnet".parse::<Network>().is_err());
        assert_eq!(Network::names(), vec!["public", "testnet", "futurenet", "local"]);
    }

    #[test]
    fn test_state_from_value() {
        let value = json!({
            "deployments": {
                "hello": {
                    "contractId": "CABC",
                    "contractName": "hello_world",
                    "deployedAt": "2024-01-15T10:30:00Z",
                    "network": "testnet"
                }
            },
            "configurations": { "defaultNetwork": "testnet" },
            "lastSync": 1_700_000_000_000i64,
            "syncVersion": 1
        });

        let state = WorkspaceState::try_from(&value).unwrap();
        assert_eq!(state.deployments.len(), 1);
        assert_eq!(state.deployments["hello"].network, Network::Testnet);
        assert_eq!(state.contract_ids().collect::<Vec<_>>(), vec!["CABC"]);
        assert_eq!(state.deployments_on(Network::Public).count(), 0);
    }

    #[test]
    fn test_state_rejects_bad_network() {
        let value = json!({
            "deployments": {
                "x": { "contractId": "C1", "deployedAt": "2024-01-01", "network": "mainnet" }
            },
            "configurations": {},
            "lastSync": 0,
            "syncVersion": 1
        });
        let err = WorkspaceState::from_value(&value).unwrap_err();
        assert!(err.to_string().starts_with("SCHEMA/"));
    }

    #[test]
    fn test_state_roundtrip_value() {
        let mut state = WorkspaceState::new(1_700_000_000_000, 1);
        state.deployments.insert(
            "token".to_string(),
            DeploymentRecord::new("CTOKEN", "2024-02-01", Network::Futurenet).with_name("token"),
        );
        let value = state.to_value().unwrap();
        assert_eq!(value["deployments"]["token"]["network"], json!("futurenet"));
        assert!(value["deployments"]["token"].get("transactionHash").is_none());
        assert_eq!(WorkspaceState::from_value(&value).unwrap(), state);
    }

    #[test]
    fn test_slot_order_survives_roundtrip() {
        let value = json!({
            "deployments": {
                "zeta": { "contractId": "C1", "deployedAt": "2024-01-01", "network": "testnet" },
                "alpha": { "contractId": "C1", "deployedAt": "2024-01-02", "network": "testnet" }
            },
            "configurations": {},
            "lastSync": 1_700_000_000_000i64,
            "syncVersion": 1
        });

        let state = WorkspaceState::from_value(&value).unwrap();
        assert_eq!(state.deployments.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);

        let back = state.to_value().unwrap();
        let slots: Vec<&String> = back["deployments"].as_object().unwrap().keys().collect();
        assert_eq!(slots, vec!["zeta", "alpha"]);
    }
}
