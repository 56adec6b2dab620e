//! Deployment environment selecting the `config/{env}.toml` overlay

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;

/// Deployment environment of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    /// Variable consulted by [`Environment::from_env`]
    pub const ENV_VAR: &'static str = "CATALOG_APP_ENV";

    /// Accepted spellings, canonical name first
    const NAMES: [(&'static str, Environment); 7] = [
        ("development", Environment::Development),
        ("dev", Environment::Development),
        ("test", Environment::Test),
        ("staging", Environment::Staging),
        ("stage", Environment::Staging),
        ("production", Environment::Production),
        ("prod", Environment::Production),
    ];

    /// Environment named by `CATALOG_APP_ENV`, `Development` when unset or
    /// unrecognised.
    pub fn from_env() -> Self {
        std::env::var(Self::ENV_VAR)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Overlay file layered on top of `default.toml`.
    pub fn config_file_name(&self) -> String {
        format!("{}.toml", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::NAMES
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, env)| *env)
            .ok_or_else(|| {
                ConfigError::EnvVarError(format!(
                    "{} must be one of development, test, staging, production; got '{}'",
                    Self::ENV_VAR,
                    s
                ))
            })
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
