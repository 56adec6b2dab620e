//! Configuration validation logic
//!
//! Range and format checks applied after all configuration layers are merged.

use crate::config::error::ConfigError;
use crate::config::settings::{
    CatalogConfig, DatabaseConfig, FileSettings, LoggerSettings, ServerConfig, Settings,
};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl ServerConfig {
    /// Validate server configuration
    ///
    /// # Validation Rules
    /// - Port must be between 1 and 65535
    /// - Request timeout must be greater than 0
    /// - Keep-alive timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::validation(
                "server.host",
                "Server host must not be empty.",
            ));
        }

        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        if self.keep_alive_timeout == 0 {
            return Err(ConfigError::validation(
                "server.keep_alive_timeout",
                "Keep-alive timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// Validate database configuration
    ///
    /// # Validation Rules
    /// - An explicit URL must use a PostgreSQL scheme
    /// - Without a URL, host, user and database name must be set
    /// - Pool sizes must be positive with min <= max
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.url.is_empty() && !self.is_valid_database_url() {
            return Err(ConfigError::validation(
                "database.url",
                "Invalid database URL format. Expected format: postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.url.is_empty() {
            for (field, value) in [
                ("database.host", &self.host),
                ("database.user", &self.user),
                ("database.name", &self.name),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError::ValidationError {
                        field: field.to_string(),
                        message: "Required when database.url is not set.".to_string(),
                    });
                }
            }
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::ValidationError {
                field: "database.min_connections".to_string(),
                message: format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            });
        }

        Ok(())
    }

    fn is_valid_database_url(&self) -> bool {
        ["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
    }
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size < 1 {
            return Err(ConfigError::ValidationError {
                field: "catalog.page_size".to_string(),
                message: format!("Page size must be at least 1, got {}.", self.page_size),
            });
        }
        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        self.file.validate()?;

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings, returning the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.logger.validate()?;
        self.catalog.validate()?;
        Ok(())
    }
}
