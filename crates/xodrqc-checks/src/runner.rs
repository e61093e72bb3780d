//! Run selected rules over one context and fold their findings into a report.
//!
//! Rules run in the order requested (registry order for [`run_all`]) and
//! findings keep the order each rule emitted them, so two runs over the same
//! map produce identical reports.

use crate::context::CheckContext;
use crate::error::ConfigError;
use crate::registry::{self, RuleSpec};
use crate::version;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use xodrqc_kernel::{Finding, Severity};

pub const CHECK_REPORT_KIND: &str = "xodrqc.check_report.v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckSummary {
    pub rule_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub skipped_rules: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub check_kind: String,
    pub result: String,
    pub findings: Vec<Finding>,
    pub summary: CheckSummary,
}

impl CheckReport {
    /// No finding of error severity.
    pub fn accepted(&self) -> bool {
        self.result == "accepted"
    }

    pub fn findings_for<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a Finding> {
        self.findings
            .iter()
            .filter(move |finding| finding.rule_id == rule_id)
    }
}

/// Every registered rule that the configuration leaves enabled.
pub fn run_all(ctx: &CheckContext<'_>) -> CheckReport {
    let (selected, skipped) = partition_enabled(ctx, registry::RULES.iter().collect());
    let findings = selected.iter().map(|spec| run_one(ctx, spec)).collect();
    build_report(selected.len(), findings, skipped)
}

/// The named rules, in the given order.
pub fn run_rules(ctx: &CheckContext<'_>, rule_ids: &[&str]) -> Result<CheckReport, ConfigError> {
    let specs = lookup(rule_ids)?;
    let (selected, skipped) = partition_enabled(ctx, specs);
    let findings = selected.iter().map(|spec| run_one(ctx, spec)).collect();
    Ok(build_report(selected.len(), findings, skipped))
}

/// Same as [`run_rules`] with rules spread over the rayon pool. The report
/// is identical to the sequential one.
pub fn run_rules_parallel(
    ctx: &CheckContext<'_>,
    rule_ids: &[&str],
) -> Result<CheckReport, ConfigError> {
    let specs = lookup(rule_ids)?;
    let (selected, skipped) = partition_enabled(ctx, specs);
    let findings = selected
        .par_iter()
        .map(|spec| run_one(ctx, spec))
        .collect();
    Ok(build_report(selected.len(), findings, skipped))
}

fn lookup(rule_ids: &[&str]) -> Result<Vec<&'static RuleSpec>, ConfigError> {
    rule_ids
        .iter()
        .map(|id| {
            registry::rule(id).ok_or_else(|| ConfigError::UnknownRule {
                section: "run".to_string(),
                rule_id: id.to_string(),
            })
        })
        .collect()
}

fn partition_enabled(
    ctx: &CheckContext<'_>,
    specs: Vec<&'static RuleSpec>,
) -> (Vec<&'static RuleSpec>, Vec<String>) {
    let mut selected = Vec::new();
    let mut skipped = Vec::new();
    for spec in specs {
        if !ctx.config.is_enabled(spec.id) {
            tracing::debug!(rule = spec.id, "rule disabled by configuration");
            skipped.push(spec.id.to_string());
        } else if !applies_to_map(ctx, spec) {
            tracing::debug!(
                rule = spec.id,
                applicable = spec.applicable_versions,
                "rule does not apply to the map's OpenDRIVE version"
            );
            skipped.push(spec.id.to_string());
        } else {
            selected.push(spec);
        }
    }
    (selected, skipped)
}

/// Maps without a version, or with one that does not parse, run every rule.
fn applies_to_map(ctx: &CheckContext<'_>, spec: &RuleSpec) -> bool {
    let Some(map_version) = ctx.map.version() else {
        return true;
    };
    match version::matches(map_version, spec.applicable_versions) {
        Ok(applies) => applies,
        Err(err) => {
            tracing::warn!(rule = spec.id, error = %err, "cannot compare OpenDRIVE versions");
            true
        }
    }
}

/// Run one rule. A panicking rule yields a single low-confidence finding
/// instead of taking the run down with it.
fn run_one(ctx: &CheckContext<'_>, spec: &RuleSpec) -> Vec<Finding> {
    let findings = match panic::catch_unwind(AssertUnwindSafe(|| (spec.check)(ctx))) {
        Ok(findings) => findings,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(rule = spec.id, reason = %reason, "rule aborted");
            vec![
                ctx.finding(spec.id, format!("rule {} aborted: {reason}", spec.id))
                    .low_confidence(),
            ]
        }
    };
    tracing::info!(
        rule = spec.id,
        severity = spec.severity.as_str(),
        findings = findings.len(),
        "rule evaluated"
    );
    findings
}

fn build_report(
    rule_count: usize,
    per_rule: Vec<Vec<Finding>>,
    skipped_rules: Vec<String>,
) -> CheckReport {
    let findings: Vec<Finding> = per_rule.into_iter().flatten().collect();
    let count = |severity: Severity| findings.iter().filter(|f| f.severity == severity).count();
    let summary = CheckSummary {
        rule_count,
        error_count: count(Severity::Error),
        warning_count: count(Severity::Warning),
        info_count: count(Severity::Info),
        skipped_rules,
    };
    let result = if summary.error_count == 0 {
        "accepted".to_string()
    } else {
        "rejected".to_string()
    };
    CheckReport {
        check_kind: CHECK_REPORT_KIND.to_string(),
        result,
        findings,
        summary,
    }
}
