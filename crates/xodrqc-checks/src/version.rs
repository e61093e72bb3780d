//! OpenDRIVE version applicability.
//!
//! Each rule carries an expression such as `">=1.7.0"` or
//! `">=1.4.0,<1.8.0"`: comma-separated clauses, each an operator
//! (`>=`, `<=`, `>`, `<`) followed by a full `major.minor.patch` version.
//! A version matches when it satisfies every clause.

use crate::error::ConfigError;
use regex::Regex;
use semver::{Version, VersionReq};
use std::sync::OnceLock;

fn clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(>=|<=|>|<)\d+\.\d+\.\d+$").expect("version clause regex must compile")
    })
}

fn clauses(expression: &str) -> impl Iterator<Item = &str> {
    expression.split(',').map(str::trim)
}

/// Every clause is an operator plus a full version.
pub fn is_valid_expression(expression: &str) -> bool {
    clauses(expression).all(|clause| clause_re().is_match(clause))
}

/// Some clause bounds the version from below.
pub fn has_lower_bound(expression: &str) -> bool {
    clauses(expression).any(|clause| clause.starts_with('>'))
}

fn requirement(expression: &str) -> Result<VersionReq, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidVersion {
        value: expression.to_string(),
        reason,
    };
    if !is_valid_expression(expression) {
        return Err(invalid(
            "expected comma-separated clauses like >=1.7.0".to_string(),
        ));
    }
    VersionReq::parse(expression).map_err(|err| invalid(err.to_string()))
}

/// Whether `version` (`major.minor.patch`) satisfies `expression`.
pub fn matches(version: &str, expression: &str) -> Result<bool, ConfigError> {
    let req = requirement(expression)?;
    let parsed = Version::parse(version.trim()).map_err(|err| ConfigError::InvalidVersion {
        value: version.to_string(),
        reason: err.to_string(),
    })?;
    Ok(req.matches(&parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expressions_need_full_versions_and_operators() {
        assert!(is_valid_expression(">=1.7.0"));
        assert!(is_valid_expression(">=1.4.0, <1.8.0"));
        assert!(!is_valid_expression(""));
        assert!(!is_valid_expression("<1.7"));
        assert!(!is_valid_expression("1.7.0"));
        assert!(!is_valid_expression("=1.7.0"));
        assert!(!is_valid_expression(">=1.7.0,"));
    }

    #[test]
    fn lower_bound_comes_from_greater_than_clauses() {
        assert!(has_lower_bound(">=1.7.0"));
        assert!(has_lower_bound("<1.8.0, >1.6.0"));
        assert!(!has_lower_bound("<=1.7.0"));
        assert!(!has_lower_bound(""));
    }

    #[test]
    fn every_clause_must_hold() {
        assert_eq!(matches("1.7.0", ">=1.7.0,>1.6.0").ok(), Some(true));
        assert_eq!(matches("1.7.0", ">=1.7.0").ok(), Some(true));
        assert_eq!(matches("1.6.0", ">=1.7.0").ok(), Some(false));
        assert_eq!(matches("1.8.0", ">=1.4.0, <1.8.0").ok(), Some(false));
        assert_eq!(matches("1.7.0", "<=1.7.0,<1.8.0").ok(), Some(true));
    }

    #[test]
    fn malformed_inputs_are_errors() {
        let err = matches("1.7.0", "<=1.7.0,<1.8").expect_err("short clause");
        assert!(matches!(err, ConfigError::InvalidVersion { .. }));
        let err = matches("1.7", ">=1.4.0").expect_err("short version");
        assert!(matches!(err, ConfigError::InvalidVersion { .. }));
    }
}
