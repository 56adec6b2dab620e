//! Configuration types for the logger

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::Level;

/// Main logger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub console: ConsoleConfig,
    pub file: FileConfig,
    pub level: String,
}

impl LoggerConfig {
    /// Create a new logger configuration with validation
    pub fn new(console: ConsoleConfig, file: FileConfig, level: String) -> Result<Self> {
        let config = Self {
            console,
            file,
            level,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.parse_level()
            .with_context(|| format!("Invalid log level: {}", self.level))?;

        self.file.validate().context("Invalid file configuration")?;

        if !self.console.enabled && !self.file.enabled {
            anyhow::bail!("At least one output (console or file) must be enabled");
        }

        Ok(())
    }

    /// Parse the log level string into a tracing::Level
    pub fn parse_level(&self) -> Result<Level> {
        match self.level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "Invalid log level '{}'. Valid levels are: trace, debug, info, warn, error",
                self.level
            ),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
            level: "info".to_string(),
        }
    }
}

/// Console output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub colored: bool,
}

impl ConsoleConfig {
    pub fn new(enabled: bool, colored: bool) -> Self {
        Self { enabled, colored }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            colored: true,
        }
    }
}

/// File output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub append: bool,
    pub format: LogFormat,
}

impl FileConfig {
    /// Create a new file configuration with validation
    pub fn new(enabled: bool, path: PathBuf, append: bool, format: LogFormat) -> Result<Self> {
        let config = Self {
            enabled,
            path,
            append,
            format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Directory creation is left to the writer.
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.path.as_os_str().is_empty() {
            anyhow::bail!("File path cannot be empty when file output is enabled");
        }
        Ok(())
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("logs/service-catalog.log"),
            append: true,
            format: LogFormat::Json,
        }
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(LogFormat::Full),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!(
                "Invalid log format '{}'. Valid formats are: full, compact, json",
                s
            ),
        }
    }
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Full => "full",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        }
    }
}
