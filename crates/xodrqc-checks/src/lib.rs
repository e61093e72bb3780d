//! # xodrqc checks
//!
//! The validation rule catalog over the kernel's road graph, lane topology
//! and geometry evaluator.
//!
//! ```text
//! CheckConfig (TOML) ─┐
//!                     ├─► CheckContext { map, graph, topology } ─► rules::*::check
//! OpenDriveMap ───────┘                                              │
//!                                                                    ▼
//!                                          runner ─► CheckReport { findings, summary }
//! ```
//!
//! Every rule is a total function `&CheckContext -> Vec<Finding>`: model
//! defects become findings, never errors. [`registry::RULES`] lists the rules
//! with their severities, reporting URIs and declared preconditions.
//! Precondition ordering is left to whoever drives the run; each rule is
//! callable on its own. Rules whose OpenDRIVE version range excludes the
//! map's version are skipped by the runner.

pub mod config;
pub mod context;
pub mod error;
pub mod registry;
pub mod rules;
pub mod runner;
pub mod version;

pub use config::{CheckConfig, ElevationStatistic, RuleSelection, Thresholds};
pub use context::CheckContext;
pub use error::ConfigError;
pub use registry::{CheckFn, RULES, RuleSpec, is_valid_rule_uri, rule, rule_ids, rule_registry_json};
pub use runner::{CHECK_REPORT_KIND, CheckReport, CheckSummary, run_all, run_rules, run_rules_parallel};
