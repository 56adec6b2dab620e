//! Configuration loader for service-catalog
//!
//! This module provides the `ConfigLoader` struct that handles loading
//! configuration from multiple sources with proper precedence.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
pub const CONFIG_DIR_ENV: &str = "CATALOG_CONFIG_DIR";

/// Environment variable for specific configuration file
pub const CONFIG_FILE_ENV: &str = "CATALOG_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "CATALOG";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

/// Configuration loader that handles layered configuration loading
///
/// The loader supports the following configuration sources (in order of priority):
/// 1. `default.toml` - Base default configuration (required)
/// 2. `{environment}.toml` - Environment-specific configuration (optional)
/// 3. `local.toml` - Local development overrides (optional)
/// 4. `CATALOG_*` environment variables (highest priority)
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    /// When set, layered loading is skipped
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a new configuration loader from `CATALOG_CONFIG_DIR`,
    /// `CATALOG_CONFIG_FILE` and `CATALOG_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns an error if both `CATALOG_CONFIG_DIR` and `CATALOG_CONFIG_FILE`
    /// are set.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from);
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && config_dir.is_some() {
            return Err(ConfigError::mutual_exclusivity(
                "CATALOG_CONFIG_DIR and CATALOG_CONFIG_FILE cannot both be set. \
                 Use CATALOG_CONFIG_DIR for layered configuration or \
                 CATALOG_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self {
            config_dir: config_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Loader bound to a single configuration file.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: Some(path.into()),
            environment: AppEnvironment::from_env(),
        }
    }

    /// Overrides the environment used to pick `{environment}.toml`.
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load and validate configuration from all sources
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `default.toml` (or the single file) is not found
    /// - Configuration parsing fails
    /// - Configuration validation fails
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;

        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match self.config_file {
            Some(ref config_file) => Self::add_file_source(builder, config_file, true)?,
            None => self.build_layered_config(builder)?,
        };

        // CATALOG_SERVER__PORT -> server.port
        Self::add_env_source(builder)
            .build()
            .map_err(ConfigError::from)
    }

    fn build_layered_config(&self, builder: Builder) -> Result<Builder, ConfigError> {
        let default_path = self.config_dir.join("default.toml");
        let builder = Self::add_file_source(builder, &default_path, true)?;

        let env_path = self
            .config_dir
            .join(self.environment.config_file_name());
        let builder = Self::add_file_source(builder, &env_path, false)?;

        let local_path = self.config_dir.join("local.toml");
        Self::add_file_source(builder, &local_path, false)
    }

    fn add_file_source(
        builder: Builder,
        path: &Path,
        required: bool,
    ) -> Result<Builder, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        let path = path.to_str().ok_or_else(|| {
            ConfigError::validation("config_file", "Configuration path is not valid UTF-8")
        })?;

        Ok(builder.add_source(File::new(path, FileFormat::Toml).required(required)))
    }

    /// Environment variables with prefix `CATALOG_` map to configuration keys,
    /// with `__` separating nested keys.
    fn add_env_source(builder: Builder) -> Builder {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        )
    }
}
