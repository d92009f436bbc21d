use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Unknown SQL dialect '{0}' (expected generic, postgres, or mysql)")]
    UnknownDialect(String),
}

/// Target SQL dialect for generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlDialectKind {
    Generic,
    Postgres,
    MySql,
}

impl Default for SqlDialectKind {
    fn default() -> Self {
        SqlDialectKind::Generic
    }
}

impl FromStr for SqlDialectKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" | "ansi" => Ok(SqlDialectKind::Generic),
            "postgres" | "postgresql" | "pg" => Ok(SqlDialectKind::Postgres),
            "mysql" | "mariadb" => Ok(SqlDialectKind::MySql),
            other => Err(ConfigError::UnknownDialect(other.to_string())),
        }
    }
}

impl std::fmt::Display for SqlDialectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SqlDialectKind::Generic => "generic",
            SqlDialectKind::Postgres => "postgres",
            SqlDialectKind::MySql => "mysql",
        };
        write!(f, "{}", name)
    }
}

/// Translator configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Target dialect for generated SQL
    pub dialect: SqlDialectKind,

    /// Rewrite a restricted join-table collection join into a correlated
    /// subquery in the on-condition instead of joining the link table
    /// inline
    pub collection_join_subquery: bool,

    /// Whether translated statements are cached keyed by query text
    pub cache_enabled: bool,

    /// Maximum number of cached translations before eviction
    pub cache_capacity: usize,

    /// Per-deployment function renames checked before the built-in
    /// registry, keyed by lowercase query-language function name
    #[serde(default)]
    pub function_overrides: HashMap<String, String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            dialect: SqlDialectKind::Generic,
            collection_join_subquery: true,
            cache_enabled: true,
            cache_capacity: 1024,
            function_overrides: HashMap::new(),
        }
    }
}

impl TranslatorConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let dialect = match env::var("HQL2SQL_DIALECT") {
            Ok(value) => value.parse()?,
            Err(_) => SqlDialectKind::Generic,
        };
        Ok(Self {
            dialect,
            collection_join_subquery: parse_env_var(
                "HQL2SQL_COLLECTION_JOIN_SUBQUERY",
                "true",
            )?,
            cache_enabled: parse_env_var("HQL2SQL_CACHE_ENABLED", "true")?,
            cache_capacity: parse_env_var("HQL2SQL_CACHE_CAPACITY", "1024")?,
            function_overrides: HashMap::new(),
        })
    }
}

/// Parse environment variable with fallback to default value
fn parse_env_var<T>(var_name: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(var_name).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: var_name.to_string(),
        value,
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_config() {
        let config = TranslatorConfig::default();
        assert_eq!(config.dialect, SqlDialectKind::Generic);
        assert!(config.collection_join_subquery);
        assert!(config.cache_enabled);
        assert_eq!(config.cache_capacity, 1024);
        assert!(config.function_overrides.is_empty());
    }

    #[test_case("generic", SqlDialectKind::Generic)]
    #[test_case("ansi", SqlDialectKind::Generic)]
    #[test_case("postgresql", SqlDialectKind::Postgres)]
    #[test_case("pg", SqlDialectKind::Postgres)]
    #[test_case("MySQL", SqlDialectKind::MySql)]
    #[test_case("mariadb", SqlDialectKind::MySql)]
    fn test_dialect_parsing(name: &str, expected: SqlDialectKind) {
        assert_eq!(name.parse::<SqlDialectKind>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_dialect_rejected() {
        assert!("oracle".parse::<SqlDialectKind>().is_err());
    }
}
