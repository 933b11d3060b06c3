//! In-place repair strategies
//!
//! Strategies run in registration order against the root object of a state
//! that has already been validated and found free of CRITICAL issues. Each
//! strategy reports one action per change it makes.

use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::info;
use wsi_core::guards::contract_id_key;
use wsi_core::{Network, RepairAction, RepairKind};

use crate::profile::IntegrityProfile;

/// A narrowly-scoped fix applied to persisted state
pub trait RepairStrategy: Send + Sync {
    /// Stable identifier, used in logs
    fn id(&self) -> &'static str;

    /// Apply the repair and describe every change made
    fn apply(&self, state: &mut Map<String, Value>, profile: &IntegrityProfile) -> Vec<RepairAction>;
}

/// The strategies a validator runs by default, in order
pub fn default_strategies() -> Vec<Box<dyn RepairStrategy>> {
    vec![
        Box::new(DuplicateDeploymentRepair),
        Box::new(InvalidEnumRepair),
        Box::new(OrphanReferenceRepair),
    ]
}

fn deployments_mut(state: &mut Map<String, Value>) -> Option<&mut Map<String, Value>> {
    state.get_mut("deployments").and_then(Value::as_object_mut)
}

/// Keeps the first slot of every contract id and removes later ones
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateDeploymentRepair;

impl RepairStrategy for DuplicateDeploymentRepair {
    fn id(&self) -> &'static str {
        "remove_duplicate"
    }

    fn apply(&self, state: &mut Map<String, Value>, _profile: &IntegrityProfile) -> Vec<RepairAction> {
        let Some(deployments) = deployments_mut(state) else {
            return Vec::new();
        };

        let mut first_slot: HashMap<String, String> = HashMap::new();
        let mut removals: Vec<(String, String, String)> = Vec::new();

        for (slot, record) in deployments.iter() {
            let Some(id) = contract_id_key(record.get("contractId")) else {
                continue;
            };

            match first_slot.get(&id) {
                Some(kept) => removals.push((slot.clone(), id, kept.clone())),
                None => {
                    first_slot.insert(id, slot.clone());
                }
            }
        }

        if removals.is_empty() {
            return Vec::new();
        }

        let doomed: HashSet<&str> = removals.iter().map(|(slot, _, _)| slot.as_str()).collect();
        deployments.retain(|slot, _| !doomed.contains(slot.as_str()));

        removals
            .iter()
            .map(|(slot, id, kept)| {
                info!(slot = %slot, contract_id = %id, "removed duplicate deployment");
                RepairAction::applied(
                    format!("deployments.{}", slot),
                    RepairKind::RemoveDuplicate,
                    format!("removed duplicate deployment of {} (kept deployments.{})", id, kept),
                )
            })
            .collect()
    }
}

/// Rewrites unknown `network` strings to the profile's default network
#[derive(Debug, Clone, Copy, Default)]
pub struct InvalidEnumRepair;

impl RepairStrategy for InvalidEnumRepair {
    fn id(&self) -> &'static str {
        "reset_invalid_enum"
    }

    fn apply(&self, state: &mut Map<String, Value>, profile: &IntegrityProfile) -> Vec<RepairAction> {
        let Some(deployments) = deployments_mut(state) else {
            return Vec::new();
        };

        let replacement = profile.default_network;
        let mut actions = Vec::new();

        for (slot, record) in deployments.iter_mut() {
            let Some(fields) = record.as_object_mut() else {
                continue;
            };
            let invalid = match fields.get("network") {
                Some(Value::String(network)) if network.parse::<Network>().is_err() => network.clone(),
                _ => continue,
            };

            fields.insert("network".to_string(), Value::String(replacement.to_string()));
            info!(slot = %slot, from = %invalid, to = %replacement, "reset invalid network");
            actions.push(RepairAction::applied(
                format!("deployments.{}.network", slot),
                RepairKind::ResetInvalidEnum,
                format!("reset network '{}' to '{}'", invalid, replacement),
            ));
        }

        actions
    }
}

/// Placeholder for cross-reference cleanup; the schema has no references yet
#[derive(Debug, Clone, Copy, Default)]
pub struct OrphanReferenceRepair;

impl RepairStrategy for OrphanReferenceRepair {
    fn id(&self) -> &'static str {
        "orphan_reference"
    }

    fn apply(&self, _state: &mut Map<String, Value>, _profile: &IntegrityProfile) -> Vec<RepairAction> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_duplicate_repair_keeps_first_slot() {
        let mut state = object(json!({
            "deployments": {
                "zeta": { "contractId": "C1" },
                "alpha": { "contractId": "C1" },
                "mid": { "contractId": "C2" },
                "last": { "contractId": "C1" }
            }
        }));

        let actions = DuplicateDeploymentRepair.apply(&mut state, &IntegrityProfile::standard());

        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].path, "deployments.alpha");
        assert_eq!(actions[1].path, "deployments.last");
        assert!(actions.iter().all(|a| a.applied && a.action == RepairKind::RemoveDuplicate));

        let remaining: Vec<&String> = state["deployments"].as_object().unwrap().keys().collect();
        assert_eq!(remaining, vec!["zeta", "mid"]);
    }

    #[test]
    fn test_duplicate_repair_groups_empty_and_numeric_ids() {
        let mut state = object(json!({
            "deployments": {
                "a": { "contractId": "" },
                "b": { "contractId": "" },
                "c": { "contractId": 7 },
                "d": { "contractId": 7 },
                "e": { "network": "local" },
                "f": { "contractId": null }
            }
        }));

        let actions = DuplicateDeploymentRepair.apply(&mut state, &IntegrityProfile::standard());

        let paths: Vec<&str> = actions.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["deployments.b", "deployments.d"]);
        let remaining: Vec<&String> = state["deployments"].as_object().unwrap().keys().collect();
        assert_eq!(remaining, vec!["a", "c", "e", "f"]);
    }

    #[test]
    fn test_enum_repair_uses_profile_default() {
        let mut state = object(json!({
            "deployments": {
                "a": { "network": "mainnet" },
                "b": { "network": "public" },
                "c": { "network": 7 }
            }
        }));
        let profile = IntegrityProfile {
            default_network: Network::Local,
            ..IntegrityProfile::standard()
        };

        let actions = InvalidEnumRepair.apply(&mut state, &profile);

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].path, "deployments.a.network");
        assert_eq!(state["deployments"]["a"]["network"], json!("local"));
        assert_eq!(state["deployments"]["b"]["network"], json!("public"));
        assert_eq!(state["deployments"]["c"]["network"], json!(7));
    }

    #[test]
    fn test_strategies_tolerate_missing_deployments() {
        let mut state = object(json!({ "deployments": [1, 2] }));
        for strategy in default_strategies() {
            assert!(strategy.apply(&mut state, &IntegrityProfile::standard()).is_empty(), "{}", strategy.id());
        }
    }
}
