//! TOML configuration for a validation run.
//!
//! ```toml
//! [geometry]
//! epsilon = 1e-6
//! integration_tolerance = 1e-3
//! max_subdivision_depth = 24
//!
//! [thresholds]
//! reference_line_gap = 0.01
//! lane_contact_gap = 0.01
//! elevation_statistic = "neighborhood_sigma"
//!
//! [rules]
//! disabled = ["redundant_info"]
//!
//! [rule_uris]
//! road_id_exists = "example.org:xodr:1.4.0:roads.id.exists"
//! ```
//!
//! Every key is optional.

use crate::error::ConfigError;
use crate::registry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use xodrqc_kernel::GeometryConfig;

/// Statistic used to flag suspicious road mid-elevations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElevationStatistic {
    /// `|mid − μ| > k · max(σ, min_sigma)` over the road's graph neighbors.
    #[default]
    NeighborhoodSigma,
    /// Gap between consecutive sorted mid-elevations above a limit.
    SortedGap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Metres allowed between the linked ends of two reference lines.
    pub reference_line_gap: f64,
    /// Metres allowed between the boundary points of lanes linked across a
    /// contact point.
    pub lane_contact_gap: f64,
    pub length_relative_tolerance: f64,
    pub length_absolute_tolerance: f64,
    /// Offsets sampled per lane section by the border-overlap rule.
    pub border_samples: usize,
    /// Coefficient tolerance when comparing polynomial records.
    pub redundant_epsilon: f64,
    pub elevation_statistic: ElevationStatistic,
    pub elevation_sigma_k: f64,
    pub elevation_min_sigma: f64,
    pub max_vertical_road_gap: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            reference_line_gap: 0.01,
            lane_contact_gap: 0.01,
            length_relative_tolerance: 1e-3,
            length_absolute_tolerance: 1e-3,
            border_samples: 16,
            redundant_epsilon: 1e-9,
            elevation_statistic: ElevationStatistic::NeighborhoodSigma,
            elevation_sigma_k: 3.0,
            elevation_min_sigma: 1.0,
            max_vertical_road_gap: 150.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleSelection {
    pub disabled: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    pub geometry: GeometryConfig,
    pub thresholds: Thresholds,
    pub rules: RuleSelection,
    /// Overrides of the rule id → rule URI table.
    pub rule_uris: BTreeMap<String, String>,
}

impl CheckConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Self::parse(text, "<string>")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    fn parse(text: &str, path: &str) -> Result<Self, ConfigError> {
        let config: CheckConfig = toml::from_str(text).map_err(|source| ConfigError::ParseToml {
            path: path.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject unknown rule ids, malformed URIs and non-positive tolerances.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for rule_id in &self.rules.disabled {
            if registry::rule(rule_id).is_none() {
                return Err(ConfigError::UnknownRule {
                    section: "rules.disabled".to_string(),
                    rule_id: rule_id.clone(),
                });
            }
        }
        for (rule_id, uri) in &self.rule_uris {
            if registry::rule(rule_id).is_none() {
                return Err(ConfigError::UnknownRule {
                    section: "rule_uris".to_string(),
                    rule_id: rule_id.clone(),
                });
            }
            if !registry::is_valid_rule_uri(uri) {
                return Err(ConfigError::InvalidRuleUri {
                    rule_id: rule_id.clone(),
                    uri: uri.clone(),
                });
            }
        }

        let positive = [
            ("geometry.epsilon", self.geometry.epsilon),
            (
                "geometry.integration_tolerance",
                self.geometry.integration_tolerance,
            ),
            (
                "thresholds.length_relative_tolerance",
                self.thresholds.length_relative_tolerance,
            ),
            (
                "thresholds.length_absolute_tolerance",
                self.thresholds.length_absolute_tolerance,
            ),
            ("thresholds.elevation_sigma_k", self.thresholds.elevation_sigma_k),
            (
                "thresholds.max_vertical_road_gap",
                self.thresholds.max_vertical_road_gap,
            ),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(key, format!("must be a positive number, got {value}")));
            }
        }
        let non_negative = [
            (
                "thresholds.reference_line_gap",
                self.thresholds.reference_line_gap,
            ),
            ("thresholds.lane_contact_gap", self.thresholds.lane_contact_gap),
            ("thresholds.redundant_epsilon", self.thresholds.redundant_epsilon),
            (
                "thresholds.elevation_min_sigma",
                self.thresholds.elevation_min_sigma,
            ),
        ];
        for (key, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(key, format!("must be a non-negative number, got {value}")));
            }
        }
        if self.thresholds.border_samples < 2 {
            return Err(invalid(
                "thresholds.border_samples",
                format!("must be at least 2, got {}", self.thresholds.border_samples),
            ));
        }
        if self.geometry.max_subdivision_depth == 0 {
            return Err(invalid(
                "geometry.max_subdivision_depth",
                "must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_enabled(&self, rule_id: &str) -> bool {
        !self.rules.disabled.iter().any(|id| id == rule_id)
    }

    /// Reporting URI of a rule, honoring `[rule_uris]` overrides.
    pub fn rule_uri(&self, rule_id: &str) -> &str {
        if let Some(uri) = self.rule_uris.get(rule_id) {
            return uri;
        }
        registry::rule(rule_id).map(|spec| spec.uri).unwrap_or("")
    }
}

fn invalid(key: &str, reason: String) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason,
    }
}
