//! Configuration file handling

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Configuration for schemaweave
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub migration: MigrationConfig,

    #[serde(default)]
    pub query: QueryConfig,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

/// Migration engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Case-insensitive name prefixes that allow a table or column to be dropped
    #[serde(default = "default_deprecation_prefixes")]
    pub deprecation_prefixes: Vec<String>,
}

impl MigrationConfig {
    /// Whether `name` passes the deprecation gate
    pub fn is_deprecated(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        self.deprecation_prefixes
            .iter()
            .any(|prefix| name.starts_with(&prefix.to_ascii_lowercase()))
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            deprecation_prefixes: default_deprecation_prefixes(),
        }
    }
}

fn default_deprecation_prefixes() -> Vec<String> {
    vec!["depr".to_string()]
}

/// Query builder settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Prefix of generated correlation aliases
    #[serde(default = "default_alias_prefix")]
    pub alias_prefix: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            alias_prefix: default_alias_prefix(),
        }
    }
}

fn default_alias_prefix() -> String {
    "X".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.query.alias_prefix, "X");
    }

    #[test]
    fn test_parse_sections() {
        let config = Config::from_toml_str(
            r#"
            [migration]
            deprecation_prefixes = ["old_", "legacy"]

            [query]
            alias_prefix = "t"
            "#,
        )
        .unwrap();

        assert!(config.migration.is_deprecated("OLD_users"));
        assert!(config.migration.is_deprecated("legacyPosts"));
        assert!(!config.migration.is_deprecated("deprecated_users"));
        assert_eq!(config.query.alias_prefix, "t");
    }

    #[test]
    fn test_default_gate() {
        let config = MigrationConfig::default();
        assert!(config.is_deprecated("deprecated_Foo"));
        assert!(config.is_deprecated("DEPRFoo"));
        assert!(!config.is_deprecated("Foo"));
    }

    #[test]
    fn test_invalid_document() {
        let err = Config::from_toml_str("[migration]\ndeprecation_prefixes = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
