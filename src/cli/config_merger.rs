//! Configuration merger for CLI arguments and config files
//!
//! Command-line flags take precedence over every file and environment
//! source handled by [`ConfigLoader`].

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, settings::Settings};

/// Applies CLI overrides on top of file-based configuration.
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    /// Create a new configuration merger with base configuration
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Loads the base configuration the CLI points at.
    ///
    /// `--config` selects a single file, otherwise the layered directory is
    /// used. `--env` overrides `CATALOG_APP_ENV`.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let loader = match cli.config {
            Some(ref path) => ConfigLoader::from_file(path),
            None => ConfigLoader::new()?,
        };
        let loader = match cli.env {
            Some(env) => loader.with_environment(env.into()),
            None => loader,
        };

        tracing::debug!(
            environment = %loader.environment(),
            config_file = ?cli.config,
            "Loading configuration"
        );

        Ok(Self::new(loader.load()?))
    }

    /// Merge CLI arguments with the base configuration and validate the
    /// result.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(Commands::Serve {
            host,
            port,
            log_level,
            dry_run: _,
        }) = &cli.command
        {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            // Command-specific level wins over the global flags
            if let Some(level) = log_level {
                config.logger.level = level.as_str().to_string();
            }
        }

        config.validate()?;

        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}
