use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Limits and switches of the query engine
#[derive(Clone, Debug, PartialEq, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Longest accepted query text, in bytes
    #[validate(range(
        min = 1,
        max = 1_048_576,
        message = "Max query length must be between 1 and 1048576"
    ))]
    pub max_query_length: usize,

    /// Deepest accepted AND/OR/NOT nesting in WHERE and HAVING. The parser
    /// rejects more than 64 nested parentheses or NOTs on its own.
    #[validate(range(
        min = 1,
        max = 64,
        message = "Max expression depth must be between 1 and 64"
    ))]
    pub max_expression_depth: usize,

    /// Log every query text at info level
    pub log_queries: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_query_length: 65_536,
            max_expression_depth: 64,
            log_queries: false,
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            max_query_length: parse_env_var("ENTITYQL_MAX_QUERY_LENGTH", "65536")?,
            max_expression_depth: parse_env_var("ENTITYQL_MAX_EXPRESSION_DEPTH", "64")?,
            log_queries: parse_env_var("ENTITYQL_LOG_QUERIES", "false")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file; missing keys take their defaults
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
