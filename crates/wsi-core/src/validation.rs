//! Validation result types
//!
//! Severity is integer-backed and totally ordered, so the overall severity of
//! a result is a plain `max()` over its issues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info = 0,
    Warning = 1,
    Error = 2,
    Critical = 3,
}

impl Severity {
    /// Whether an issue at this severity invalidates the state
    pub fn is_blocking(&self) -> bool {
        *self >= Severity::Error
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Info
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Machine-readable issue codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    InvalidRoot,
    MissingField,
    InvalidType,
    InvalidDeployment,
    MissingContractId,
    InvalidContractId,
    UndefinedConfigValue,
    TimestampOutOfRange,
    InvalidEnum,
    DuplicateContractId,
    NegativeTimestamp,
    TimestampCorruption,
    FutureProtocolVersion,
    InvalidDate,
    TruncatedContractId,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::InvalidRoot => "INVALID_ROOT",
            IssueCode::MissingField => "MISSING_FIELD",
            IssueCode::InvalidType => "INVALID_TYPE",
            IssueCode::InvalidDeployment => "INVALID_DEPLOYMENT",
            IssueCode::MissingContractId => "MISSING_CONTRACT_ID",
            IssueCode::InvalidContractId => "INVALID_CONTRACT_ID",
            IssueCode::UndefinedConfigValue => "UNDEFINED_CONFIG_VALUE",
            IssueCode::TimestampOutOfRange => "TIMESTAMP_OUT_OF_RANGE",
            IssueCode::InvalidEnum => "INVALID_ENUM",
            IssueCode::DuplicateContractId => "DUPLICATE_CONTRACT_ID",
            IssueCode::NegativeTimestamp => "NEGATIVE_TIMESTAMP",
            IssueCode::TimestampCorruption => "TIMESTAMP_CORRUPTION",
            IssueCode::FutureProtocolVersion => "FUTURE_PROTOCOL_VERSION",
            IssueCode::InvalidDate => "INVALID_DATE",
            IssueCode::TruncatedContractId => "TRUNCATED_CONTRACT_ID",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted path into the state (e.g. "deployments.token.network")
    pub path: String,
    pub message: String,
    pub severity: Severity,
    pub code: IssueCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl ValidationIssue {
    pub fn new(
        path: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        code: IssueCode,
    ) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity,
            code,
            context: None,
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}: {} ({})", self.severity, self.path, self.message, self.code)
    }
}

/// Kinds of in-place repair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairKind {
    RemoveDuplicate,
    ResetInvalidEnum,
}

impl RepairKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepairKind::RemoveDuplicate => "remove_duplicate",
            RepairKind::ResetInvalidEnum => "reset_invalid_enum",
        }
    }
}

impl fmt::Display for RepairKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A repair that was attempted on the state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairAction {
    pub path: String,
    pub action: RepairKind,
    pub details: String,
    pub applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RepairAction {
    pub fn applied(path: impl Into<String>, action: RepairKind, details: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            action,
            details: details.into(),
            applied: true,
            error: None,
        }
    }
}

/// Issue and repair counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total_issues: usize,
    pub critical: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub repairs_attempted: usize,
    pub repairs_applied: usize,
}

impl ValidationSummary {
    fn tally(issues: &[ValidationIssue], repairs: &[RepairAction]) -> Self {
        let count = |severity: Severity| issues.iter().filter(|i| i.severity == severity).count();
        Self {
            total_issues: issues.len(),
            critical: count(Severity::Critical),
            errors: count(Severity::Error),
            warnings: count(Severity::Warning),
            info: count(Severity::Info),
            repairs_attempted: repairs.len(),
            repairs_applied: repairs.iter().filter(|r| r.applied).count(),
        }
    }
}

/// Outcome of one validation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// False iff any ERROR or CRITICAL issue exists
    pub valid: bool,
    /// Highest issue severity, INFO when there are no issues
    pub severity: Severity,
    pub issues: Vec<ValidationIssue>,
    pub repairs: Vec<RepairAction>,
    pub summary: ValidationSummary,
    pub timestamp: DateTime<Utc>,
}

impl ValidationResult {
    /// Derive validity, severity and counts from the collected issues
    pub fn from_parts(
        issues: Vec<ValidationIssue>,
        repairs: Vec<RepairAction>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let severity = issues
            .iter()
            .map(|i| i.severity)
            .max()
            .unwrap_or(Severity::Info);
        let valid = !issues.iter().any(|i| i.severity.is_blocking());
        let summary = ValidationSummary::tally(&issues, &repairs);

        Self {
            valid,
            severity,
            issues,
            repairs,
            summary,
            timestamp,
        }
    }

    /// Replace the repair list and refresh the counts
    pub fn with_repairs(mut self, repairs: Vec<RepairAction>) -> Self {
        self.summary = ValidationSummary::tally(&self.issues, &repairs);
        self.repairs = repairs;
        self
    }

    pub fn has_critical(&self) -> bool {
        self.severity == Severity::Critical
    }

    pub fn issues_with_code(&self, code: IssueCode) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }

    pub fn has_issue(&self, code: IssueCode) -> bool {
        self.issues_with_code(code).next().is_some()
    }

    pub fn issues_at_least(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity >= severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue(severity: Severity) -> ValidationIssue {
        ValidationIssue::new("lastSync", "test", severity, IssueCode::InvalidType)
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
        assert_eq!(Severity::Critical as u8, 3);
        assert!(!Severity::Warning.is_blocking());
        assert!(Severity::Error.is_blocking());
    }

    #[test]
    fn test_empty_result_is_valid_info() {
        let result = ValidationResult::from_parts(vec![], vec![], Utc::now());
        assert!(result.valid);
        assert_eq!(result.severity, Severity::Info);
        assert_eq!(result.summary, ValidationSummary::default());
    }

    #[test]
    fn test_warnings_stay_valid() {
        let result = ValidationResult::from_parts(
            vec![issue(Severity::Info), issue(Severity::Warning)],
            vec![],
            Utc::now(),
        );
        assert!(result.valid);
        assert_eq!(result.severity, Severity::Warning);
        assert_eq!(result.summary.warnings, 1);
        assert_eq!(result.summary.info, 1);
    }

    #[test]
    fn test_max_severity_wins() {
        let result = ValidationResult::from_parts(
            vec![issue(Severity::Warning), issue(Severity::Critical), issue(Severity::Error)],
            vec![],
            Utc::now(),
        );
        assert!(!result.valid);
        assert!(result.has_critical());
        assert_eq!(result.issues_at_least(Severity::Error).count(), 2);
    }

    #[test]
    fn test_with_repairs_updates_summary() {
        let result = ValidationResult::from_parts(vec![issue(Severity::Warning)], vec![], Utc::now())
            .with_repairs(vec![
                RepairAction::applied("deployments.a", RepairKind::RemoveDuplicate, "removed"),
                RepairAction {
                    applied: false,
                    error: Some("not an object".to_string()),
                    ..RepairAction::applied("deployments.b", RepairKind::ResetInvalidEnum, "skipped")
                },
            ]);
        assert_eq!(result.summary.repairs_attempted, 2);
        assert_eq!(result.summary.repairs_applied, 1);
    }

    #[test]
    fn test_wire_format() {
        let issue = ValidationIssue::new("lastSync", "negative timestamp", Severity::Critical, IssueCode::NegativeTimestamp)
            .with_context(json!({ "value": -5 }));
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["severity"], json!("CRITICAL"));
        assert_eq!(json["code"], json!("NEGATIVE_TIMESTAMP"));

        let action = RepairAction::applied("p", RepairKind::ResetInvalidEnum, "d");
        assert_eq!(serde_json::to_value(&action).unwrap()["action"], json!("reset_invalid_enum"));
    }

    #[test]
    fn test_issue_display() {
        let issue = ValidationIssue::new("syncVersion", "must be numeric", Severity::Error, IssueCode::InvalidType);
        assert_eq!(issue.to_string(), "[ERROR] syncVersion: must be numeric (INVALID_TYPE)");
    }
}
