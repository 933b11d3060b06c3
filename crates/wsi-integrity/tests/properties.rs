//! Property tests over arbitrary JSON and generated workspace states.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use wsi_core::{IssueCode, Severity};
use wsi_integrity::{check, validate, ValidateOptions};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e15..1.0e15f64).prop_map(|f| json!(f)),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z]{1,10}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn arb_contract_id() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!(format!("C{}", "A".repeat(55)))),
        Just(json!(format!("C{}", "B".repeat(55)))),
        Just(json!("")),
        Just(json!("not-a-contract")),
        Just(Value::Null),
        any::<u8>().prop_map(|n| json!(n)),
    ]
}

fn arb_network() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!("public")),
        Just(json!("testnet")),
        Just(json!("futurenet")),
        Just(json!("local")),
        Just(json!("mainnet")),
        Just(json!(42)),
        Just(Value::Null),
    ]
}

fn arb_deployment() -> impl Strategy<Value = Value> {
    (
        arb_contract_id(),
        arb_network(),
        prop_oneof![
            Just(json!("2024-01-01T00:00:00Z")),
            Just(json!("2023-12-31")),
            Just(json!("yesterday")),
            Just(json!(17)),
        ],
    )
        .prop_map(|(id, network, deployed_at)| {
            let mut record = Map::new();
            record.insert("contractId".to_string(), id);
            record.insert("network".to_string(), network);
            record.insert("deployedAt".to_string(), deployed_at);
            Value::Object(record)
        })
}

fn arb_workspace_state() -> impl Strategy<Value = Value> {
    (
        prop::collection::btree_map("[a-z]{1,6}", arb_deployment(), 0..6),
        prop_oneof![
            Just(json!(-5)),
            Just(json!(0)),
            Just(json!(1_700_000_000_000_i64)),
            Just(json!(4_102_444_800_000_i64)),
            Just(json!("soon")),
        ],
        0u32..4,
    )
        .prop_map(|(deployments, last_sync, sync_version)| {
            json!({
                "deployments": Value::Object(deployments.into_iter().collect()),
                "configurations": { "rpcUrl": "http://localhost:8000", "unset": null },
                "lastSync": last_sync,
                "syncVersion": sync_version
            })
        })
}

proptest! {
    #[test]
    fn prop_validate_without_repair_never_mutates(state in arb_json()) {
        let mut working = state.clone();
        let result = validate(&mut working, &ValidateOptions::default());
        prop_assert_eq!(&working, &state);
        prop_assert!(result.repairs.is_empty());
    }

    #[test]
    fn prop_critical_means_no_repairs(state in arb_workspace_state()) {
        let mut working = state.clone();
        let result = validate(&mut working, &ValidateOptions::default().with_repair());
        if result.has_critical() {
            prop_assert!(result.repairs.is_empty());
            prop_assert_eq!(&working, &state);
        }
    }

    #[test]
    fn prop_validity_follows_severity(state in arb_workspace_state()) {
        let result = check(&state, &ValidateOptions::default());
        let max = result.issues.iter().map(|i| i.severity).max().unwrap_or(Severity::Info);
        prop_assert_eq!(result.severity, max);
        prop_assert_eq!(result.valid, max < Severity::Error);
        prop_assert_eq!(result.summary.total_issues, result.issues.len());
    }

    #[test]
    fn prop_repair_clears_repairable_issues(state in arb_workspace_state()) {
        let mut working = state.clone();
        let result = validate(&mut working, &ValidateOptions::default().with_repair());
        if !result.has_critical() {
            let recheck = check(&working, &ValidateOptions::default());
            prop_assert!(!recheck.has_issue(IssueCode::DuplicateContractId));
            prop_assert!(!recheck.has_issue(IssueCode::InvalidEnum));
        }
    }
}
