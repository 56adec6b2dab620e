//! Errors raised while loading or validating settings

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required file such as `config/default.toml` is missing
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Sources merged but did not deserialize into `Settings`
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A value is out of range; `field` is the dotted settings path
    #[error("Invalid value for {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("Environment variable error: {0}")]
    EnvVarError(String),

    /// `CATALOG_CONFIG_FILE` and `CATALOG_CONFIG_DIR` were both set
    #[error("Conflicting configuration sources: {0}")]
    MutualExclusivityError(String),

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found<S: Into<String>>(path: S) -> Self {
        ConfigError::FileNotFound(path.into())
    }

    pub fn mutual_exclusivity<S: Into<String>>(message: S) -> Self {
        ConfigError::MutualExclusivityError(message.into())
    }
}
