//! Configuration management for service-catalog
//!
//! Layered loading with support for:
//! - TOML configuration files
//! - Environment variable overrides
//! - Per-environment files (development, test, staging, production)
//!
//! # Configuration Priority (lowest to highest)
//! 1. `default.toml` - Base default configuration
//! 2. `{environment}.toml` - Environment-specific configuration
//! 3. `local.toml` - Local development overrides (not committed to version control)
//! 4. `CATALOG_*` environment variables

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{CatalogConfig, DatabaseConfig, LoggerSettings, ServerConfig, Settings};
