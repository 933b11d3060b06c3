//! Human-readable validation reports
use handlebars::Handlebars;
use once_cell::sync::Lazy;
use serde_json::Value;
use wsi_core::{ValidationResult, WsiError};

const REPORT_TEMPLATE_NAME: &str = "validation_report";

const REPORT_TEMPLATE: &str = "\
Workspace State Validation Report
Generated: {{timestamp}}
Status: {{status}} (severity {{severity}})

Summary
  Total issues: {{summary.totalIssues}}
  Critical: {{summary.critical}}
  Errors: {{summary.errors}}
  Warnings: {{summary.warnings}}
  Info: {{summary.info}}
  Repairs applied: {{summary.repairsApplied}}/{{summary.repairsAttempted}}

Issues
{{#each issues}}
  [{{severity}}] {{path}}: {{message}} ({{code}})
{{else}}
  (none)
{{/each}}

Repairs
{{#each repairs}}
  {{#if applied}}[applied]{{else}}[failed]{{/if}} {{action}} {{path}}: {{details}}{{#if error}} ({{error}}){{/if}}
{{else}}
  (none)
{{/each}}
";

static REPORT: Lazy<Handlebars<'static>> = Lazy::new(|| {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(false);
    handlebars.register_escape_fn(handlebars::no_escape);
    if let Err(err) = handlebars.register_template_string(REPORT_TEMPLATE_NAME, REPORT_TEMPLATE) {
        tracing::error!(%err, "validation report template failed to compile");
    }
    handlebars
});

/// Render a validation result as a plain-text report
pub fn format_result(result: &ValidationResult) -> Result<String, WsiError> {
    let mut data = serde_json::to_value(result)?;
    if let Value::Object(fields) = &mut data {
        let status = if result.valid { "VALID" } else { "INVALID" };
        fields.insert("status".to_string(), Value::String(status.to_string()));
    }

    REPORT
        .render(REPORT_TEMPLATE_NAME, &data)
        .map_err(|e| WsiError::RenderError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wsi_core::{IssueCode, RepairAction, RepairKind, Severity, ValidationIssue};

    #[test]
    fn test_report_sections() {
        let result = ValidationResult::from_parts(
            vec![
                ValidationIssue::new("lastSync", "negative timestamp", Severity::Critical, IssueCode::NegativeTimestamp),
                ValidationIssue::new("deployments.a.network", "unknown network 'mainnet'", Severity::Warning, IssueCode::InvalidEnum),
            ],
            vec![],
            Utc::now(),
        );

        let report = format_result(&result).unwrap();
        assert!(report.contains("Status: INVALID (severity CRITICAL)"));
        assert!(report.contains("Total issues: 2"));
        assert!(report.contains("[CRITICAL] lastSync: negative timestamp (NEGATIVE_TIMESTAMP)"));
        assert!(report.contains("[WARNING] deployments.a.network: unknown network 'mainnet' (INVALID_ENUM)"));
        assert!(report.contains("(none)"));
    }

    #[test]
    fn test_report_lists_repairs() {
        let result = ValidationResult::from_parts(vec![], vec![], Utc::now()).with_repairs(vec![
            RepairAction::applied("deployments.b", RepairKind::RemoveDuplicate, "removed duplicate"),
        ]);

        let report = format_result(&result).unwrap();
        assert!(report.contains("Status: VALID"));
        assert!(report.contains("[applied] remove_duplicate deployments.b: removed duplicate"));
        assert!(report.contains("Repairs applied: 1/1"));
    }
}
