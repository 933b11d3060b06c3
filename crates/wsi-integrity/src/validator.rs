//! Validation orchestration
//!
//! Runs the passes against a fresh [`PassContext`], aggregates severity, and
//! applies repair strategies when the caller asked for them and nothing
//! CRITICAL was found.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};
use wsi_core::{RepairAction, ValidationIssue, ValidationResult, WsiError};

use crate::options::ValidateOptions;
use crate::passes::{self, PassContext};
use crate::profile::{IntegrityProfile, DEFAULT_CONTRACT_ID_PATTERN};
use crate::repair::{default_strategies, RepairStrategy};

lazy_static! {
    static ref DEFAULT_CONTRACT_ID: Regex =
        Regex::new(DEFAULT_CONTRACT_ID_PATTERN).expect("default contract id pattern compiles");
}

/// Schema, corruption and repair engine for persisted workspace state
pub struct IntegrityValidator {
    profile: IntegrityProfile,
    contract_id: Regex,
    strategies: Vec<Box<dyn RepairStrategy>>,
}

impl IntegrityValidator {
    /// Build a validator; fails when the profile's contract id pattern is not a valid regex
    pub fn new(profile: IntegrityProfile) -> Result<Self, WsiError> {
        let contract_id = Regex::new(&profile.contract_id_pattern).map_err(|e| {
            WsiError::ConfigError(format!("invalid contract_id_pattern: {}", e))
        })?;

        Ok(Self {
            profile,
            contract_id,
            strategies: default_strategies(),
        })
    }

    /// Append a repair strategy after the defaults
    pub fn with_strategy(mut self, strategy: Box<dyn RepairStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn profile(&self) -> &IntegrityProfile {
        &self.profile
    }

    /// Identifiers of the registered repair strategies, in run order
    pub fn strategy_ids(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.id()).collect()
    }

    /// Validate `state`, repairing it in place when `options.auto_repair` is set
    pub fn validate(&self, state: &mut Value, options: &ValidateOptions) -> ValidationResult {
        let result = self.check(state, options);

        if !options.auto_repair {
            return result;
        }
        if result.has_critical() {
            warn!(
                critical = result.summary.critical,
                "auto-repair refused: state has critical issues"
            );
            return result;
        }

        let repairs = self.repair(state);
        if !repairs.is_empty() {
            info!(
                applied = repairs.iter().filter(|r| r.applied).count(),
                attempted = repairs.len(),
                "workspace state repaired"
            );
        }
        result.with_repairs(repairs)
    }

    /// Validate without ever touching `state`
    pub fn check(&self, state: &Value, options: &ValidateOptions) -> ValidationResult {
        let now = options.now();
        let mut ctx = PassContext::new(&self.profile, &self.contract_id, now);

        if let Some(root) = passes::structure(state, &mut ctx) {
            passes::data_types(root, &mut ctx);
            passes::enums(root, &mut ctx);
            if options.check_relationships {
                passes::relationships(root, &mut ctx);
            }
            if options.detect_corruption {
                passes::corruption(root, &mut ctx);
            }
        }

        log_issues(&ctx.issues, options.log_verbose);

        let result = ValidationResult::from_parts(ctx.issues, Vec::new(), now);
        debug!(
            valid = result.valid,
            severity = %result.severity,
            issues = result.summary.total_issues,
            "workspace state validated"
        );
        result
    }

    fn repair(&self, state: &mut Value) -> Vec<RepairAction> {
        let Some(root) = state.as_object_mut() else {
            return Vec::new();
        };

        let mut actions = Vec::new();
        for strategy in &self.strategies {
            let applied = strategy.apply(root, &self.profile);
            debug!(strategy = strategy.id(), actions = applied.len(), "repair strategy ran");
            actions.extend(applied);
        }
        actions
    }
}

impl Default for IntegrityValidator {
    fn default() -> Self {
        Self {
            profile: IntegrityProfile::standard(),
            contract_id: DEFAULT_CONTRACT_ID.clone(),
            strategies: default_strategies(),
        }
    }
}

fn log_issues(issues: &[ValidationIssue], verbose: bool) {
    for issue in issues {
        if verbose {
            info!(code = %issue.code, severity = %issue.severity, path = %issue.path, "{}", issue.message);
        } else {
            debug!(code = %issue.code, severity = %issue.severity, path = %issue.path, "{}", issue.message);
        }
    }
}
