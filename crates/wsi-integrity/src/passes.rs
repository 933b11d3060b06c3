//! The five validation passes
//!
//! Each pass reads the untyped state and appends issues to a per-call
//! [`PassContext`]. Passes never mutate the state.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{json, Map, Value};
use wsi_core::guards::{contract_id_key, find_duplicate_ids, is_date_like, is_number, is_object, is_string, present};
use wsi_core::{IssueCode, Network, Severity, ValidationIssue};

use crate::profile::IntegrityProfile;

/// Path used for issues about the state as a whole
pub const ROOT_PATH: &str = "$";

const REQUIRED_FIELDS: [&str; 4] = ["deployments", "configurations", "lastSync", "syncVersion"];

/// Accumulator for one validation call
pub struct PassContext<'a> {
    pub profile: &'a IntegrityProfile,
    pub contract_id: &'a Regex,
    pub now: DateTime<Utc>,
    pub issues: Vec<ValidationIssue>,
}

impl<'a> PassContext<'a> {
    pub fn new(profile: &'a IntegrityProfile, contract_id: &'a Regex, now: DateTime<Utc>) -> Self {
        Self {
            profile,
            contract_id,
            now,
            issues: Vec::new(),
        }
    }

    fn report(&mut self, path: impl Into<String>, message: impl Into<String>, severity: Severity, code: IssueCode) {
        self.issues.push(ValidationIssue::new(path, message, severity, code));
    }

    fn report_with(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        code: IssueCode,
        context: Value,
    ) {
        self.issues
            .push(ValidationIssue::new(path, message, severity, code).with_context(context));
    }

    fn now_ms(&self) -> f64 {
        self.now.timestamp_millis() as f64
    }
}

fn deployment_path(slot: &str) -> String {
    format!("deployments.{}", slot)
}

fn field_path(slot: &str, field: &str) -> String {
    format!("deployments.{}.{}", slot, field)
}

/// Object-shaped deployment records with their slot keys
fn deployment_records(state: &Map<String, Value>) -> impl Iterator<Item = (&String, &Map<String, Value>)> {
    state
        .get("deployments")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|deployments| deployments.iter())
        .filter_map(|(slot, record)| record.as_object().map(|r| (slot, r)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Pass 1: shape of the aggregate and of every deployment record.
///
/// Returns the root object, or `None` after reporting a non-object root.
pub fn structure<'s>(state: &'s Value, ctx: &mut PassContext) -> Option<&'s Map<String, Value>> {
    let Some(root) = state.as_object() else {
        ctx.report_with(
            ROOT_PATH,
            "workspace state must be an object",
            Severity::Critical,
            IssueCode::InvalidRoot,
            json!({ "found": type_name(state) }),
        );
        return None;
    };

    for field in REQUIRED_FIELDS {
        if present(root, field).is_none() {
            ctx.report(field, format!("required field '{}' is missing", field), Severity::Error, IssueCode::MissingField);
        }
    }

    if let Some(deployments) = present(root, "deployments") {
        match deployments.as_object() {
            Some(records) => {
                for (slot, record) in records {
                    deployment_structure(slot, record, ctx);
                }
            }
            None => ctx.report_with(
                "deployments",
                "deployments must be an object keyed by slot",
                Severity::Error,
                IssueCode::InvalidType,
                json!({ "found": type_name(deployments) }),
            ),
        }
    }

    if let Some(configurations) = present(root, "configurations") {
        match configurations.as_object() {
            Some(values) => {
                for (key, value) in values {
                    if value.is_null() {
                        ctx.report(
                            format!("configurations.{}", key),
                            "configuration value is undefined",
                            Severity::Info,
                            IssueCode::UndefinedConfigValue,
                        );
                    }
                }
            }
            None => ctx.report_with(
                "configurations",
                "configurations must be an object",
                Severity::Error,
                IssueCode::InvalidType,
                json!({ "found": type_name(configurations) }),
            ),
        }
    }

    if let Some(version) = present(root, "syncVersion") {
        if !is_number(version) {
            ctx.report_with(
                "syncVersion",
                "syncVersion must be numeric",
                Severity::Error,
                IssueCode::InvalidType,
                json!({ "found": type_name(version) }),
            );
        }
    }

    Some(root)
}

fn deployment_structure(slot: &str, record: &Value, ctx: &mut PassContext) {
    let Some(fields) = record.as_object() else {
        ctx.report_with(
            deployment_path(slot),
            "deployment record must be an object",
            Severity::Error,
            IssueCode::InvalidDeployment,
            json!({ "found": type_name(record) }),
        );
        return;
    };

    match present(fields, "contractId") {
        None => ctx.report(
            field_path(slot, "contractId"),
            "deployment has no contractId",
            Severity::Warning,
            IssueCode::MissingContractId,
        ),
        Some(Value::String(id)) if ctx.contract_id.is_match(id) => {}
        Some(id) => ctx.report_with(
            field_path(slot, "contractId"),
            "contractId does not match the contract identifier format",
            Severity::Warning,
            IssueCode::InvalidContractId,
            json!({ "value": id, "pattern": ctx.profile.contract_id_pattern }),
        ),
    }

    for field in ["deployedAt", "network"] {
        match present(fields, field) {
            None => ctx.report(
                field_path(slot, field),
                format!("required field '{}' is missing", field),
                Severity::Error,
                IssueCode::MissingField,
            ),
            Some(value) if !is_string(value) => ctx.report_with(
                field_path(slot, field),
                format!("{} must be a string", field),
                Severity::Error,
                IssueCode::InvalidType,
                json!({ "found": type_name(value) }),
            ),
            Some(_) => {}
        }
    }

    if let Some(hash) = present(fields, "transactionHash") {
        if !is_string(hash) {
            ctx.report_with(
                field_path(slot, "transactionHash"),
                "transactionHash must be a string",
                Severity::Warning,
                IssueCode::InvalidType,
                json!({ "found": type_name(hash) }),
            );
        }
    }

    if let Some(metadata) = present(fields, "metadata") {
        if !is_object(metadata) {
            ctx.report_with(
                field_path(slot, "metadata"),
                "metadata must be an object",
                Severity::Warning,
                IssueCode::InvalidType,
                json!({ "found": type_name(metadata) }),
            );
        }
    }
}

/// Pass 2: `lastSync` is a number inside the plausible window (future tolerated)
pub fn data_types(root: &Map<String, Value>, ctx: &mut PassContext) {
    let Some(last_sync) = present(root, "lastSync") else {
        return;
    };

    match last_sync.as_f64() {
        None => ctx.report_with(
            "lastSync",
            "lastSync must be numeric",
            Severity::Error,
            IssueCode::InvalidType,
            json!({ "found": type_name(last_sync) }),
        ),
        Some(ts) => {
            let window = ctx.profile.lenient_window(ctx.now_ms());
            if !window.contains(ts) {
                ctx.report_with(
                    "lastSync",
                    "lastSync is outside the plausible range",
                    Severity::Warning,
                    IssueCode::TimestampOutOfRange,
                    json!({ "value": last_sync }),
                );
            }
        }
    }
}

/// Pass 3: every string `network` names a known network
pub fn enums(root: &Map<String, Value>, ctx: &mut PassContext) {
    let invalid: Vec<(String, String)> = deployment_records(root)
        .filter_map(|(slot, record)| match record.get("network") {
            Some(Value::String(network)) if network.parse::<Network>().is_err() => {
                Some((slot.clone(), network.clone()))
            }
            _ => None,
        })
        .collect();

    for (slot, network) in invalid {
        ctx.report_with(
            field_path(&slot, "network"),
            format!("unknown network '{}'", network),
            Severity::Warning,
            IssueCode::InvalidEnum,
            json!({ "value": network, "allowed": Network::names() }),
        );
    }
}

/// Pass 4: contract ids are unique across deployments
pub fn relationships(root: &Map<String, Value>, ctx: &mut PassContext) {
    let ids: Vec<String> = deployment_records(root)
        .filter_map(|(_, record)| contract_id_key(record.get("contractId")))
        .collect();

    let duplicates = find_duplicate_ids(ids.iter().map(String::as_str));
    if duplicates.is_empty() {
        return;
    }

    let listed: Vec<&str> = duplicates.keys().map(String::as_str).collect();
    ctx.report_with(
        "deployments",
        format!("contract deployed in more than one slot: {}", listed.join(", ")),
        Severity::Warning,
        IssueCode::DuplicateContractId,
        json!({ "duplicates": duplicates }),
    );
}

/// Pass 5: impossible values that indicate damaged state
pub fn corruption(root: &Map<String, Value>, ctx: &mut PassContext) {
    if let Some(ts) = root.get("lastSync").and_then(Value::as_f64) {
        if ts < 0.0 {
            ctx.report_with(
                "lastSync",
                "negative timestamp",
                Severity::Critical,
                IssueCode::NegativeTimestamp,
                json!({ "value": root["lastSync"] }),
            );
        } else if !ctx.profile.strict_window(ctx.now_ms()).contains(ts) {
            ctx.report_with(
                "lastSync",
                "timestamp corruption: lastSync is implausibly old or in the future",
                Severity::Critical,
                IssueCode::TimestampCorruption,
                json!({ "value": root["lastSync"], "now": ctx.now_ms() as i64 }),
            );
        }
    }

    if let Some(version) = root.get("syncVersion").and_then(Value::as_f64) {
        let current = ctx.profile.current_protocol_version;
        if version > current as f64 {
            ctx.report_with(
                "syncVersion",
                "future protocol version",
                Severity::Warning,
                IssueCode::FutureProtocolVersion,
                json!({ "value": root["syncVersion"], "current": current }),
            );
        }
    }

    let mut found = Vec::new();
    for (slot, record) in deployment_records(root) {
        if let Some(Value::String(deployed_at)) = record.get("deployedAt") {
            if !is_date_like(deployed_at) {
                found.push(
                    ValidationIssue::new(
                        field_path(slot, "deployedAt"),
                        format!("deployedAt '{}' is not a valid date", deployed_at),
                        Severity::Error,
                        IssueCode::InvalidDate,
                    )
                    .with_context(json!({ "value": deployed_at })),
                );
            }
        }
        if let Some(Value::String(id)) = record.get("contractId") {
            if id.is_empty() {
                found.push(ValidationIssue::new(
                    field_path(slot, "contractId"),
                    "empty contractId, possible truncation",
                    Severity::Error,
                    IssueCode::TruncatedContractId,
                ));
            }
        }
    }
    ctx.issues.extend(found);
}
