//! Error types for configuration and rule selection.

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A rule id that is not in the registry.
    #[error("unknown rule id in {section}: {rule_id}")]
    UnknownRule { section: String, rule_id: String },

    #[error("invalid rule uri for {rule_id}: {uri}")]
    InvalidRuleUri { rule_id: String, uri: String },

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// A malformed OpenDRIVE version or applicability expression.
    #[error("invalid version {value}: {reason}")]
    InvalidVersion { value: String, reason: String },
}
