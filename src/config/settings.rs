//! Configuration settings structures for service-catalog
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::path::PathBuf;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "service-catalog".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_keep_alive_timeout() -> u64 {
    75
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_name() -> String {
    "servicecatalog".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/service-catalog.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_page_size() -> i64 {
    2
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Keep-alive timeout in seconds
    #[serde(default = "default_keep_alive_timeout")]
    pub keep_alive_timeout: u64,
}

impl ServerConfig {
    /// Get the full server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            keep_alive_timeout: default_keep_alive_timeout(),
        }
    }
}

// ============================================================================
// Database Configuration
// ============================================================================

/// PostgreSQL connection configuration
///
/// Either `url` is set, or the connection string is assembled from the
/// individual parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the parts below
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_db_host")]
    pub host: String,

    #[serde(default = "default_db_port")]
    pub port: u16,

    #[serde(default = "default_db_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_db_name")]
    pub name: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of idle connections kept in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,

    /// Whether to run pending migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,
}

/// Everything but RFC 3986 unreserved characters is escaped in the
/// user and password parts of an assembled URL.
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

impl DatabaseConfig {
    /// Connection URL used by the pool and the migration runner.
    ///
    /// When assembled from parts, the user and password are percent-encoded.
    pub fn connection_url(&self) -> String {
        if !self.url.is_empty() {
            return self.url.clone();
        }

        let user = utf8_percent_encode(&self.user, USERINFO);
        if self.password.is_empty() {
            format!(
                "postgres://{}@{}:{}/{}",
                user, self.host, self.port, self.name
            )
        } else {
            format!(
                "postgres://{}:{}@{}:{}/{}",
                user,
                utf8_percent_encode(&self.password, USERINFO),
                self.host,
                self.port,
                self.name
            )
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            host: default_db_host(),
            port: default_db_port(),
            user: default_db_user(),
            password: String::new(),
            name: default_db_name(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout: default_connection_timeout(),
            auto_migrate: false,
        }
    }
}

// ============================================================================
// Catalog Configuration
// ============================================================================

/// Catalog query behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Number of items per page for service and version listings
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub path: String,

    /// Whether to append to an existing file
    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert the file representation into the runtime `LoggerConfig`
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console_config = self.console.into_console_config();
        let file_config = self.file.into_file_config()?;

        LoggerConfig::new(console_config, file_config, self.level).map_err(|e| {
            ConfigError::ValidationError {
                field: "logger".to_string(),
                message: e.to_string(),
            }
        })
    }
}

impl ConsoleSettings {
    pub fn into_console_config(self) -> ConsoleConfig {
        ConsoleConfig::new(self.enabled, self.colored)
    }
}

impl FileSettings {
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self.parse_format()?;

        FileConfig::new(self.enabled, PathBuf::from(self.path), self.append, format).map_err(
            |e| ConfigError::ValidationError {
                field: "logger.file".to_string(),
                message: e.to_string(),
            },
        )
    }

    fn parse_format(&self) -> Result<LogFormat, ConfigError> {
        self.format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: e.to_string(),
            })
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logger: LoggerSettings,

    #[serde(default)]
    pub catalog: CatalogConfig,
}
