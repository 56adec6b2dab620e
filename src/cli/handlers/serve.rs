//! Serve command handler
//!
//! Handles the serve command including dry-run validation and server startup.

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::server::Server;

/// Handler for the serve command
pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    /// Create a new serve command handler
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Execute the serve command with optional dry-run support
    ///
    /// # Errors
    /// - Configuration validation errors
    /// - Server startup errors (if not dry-run)
    pub async fn execute(self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            return self.validate_only();
        }

        Server::new(self.config).run().await?;
        Ok(())
    }

    /// Validate configuration without starting the server
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;

        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!(
            "✓ Database: {}:{}/{}",
            self.config.database.host, self.config.database.port, self.config.database.name
        );
        println!("✓ Page size: {}", self.config.catalog.page_size);

        println!("Dry run completed successfully - configuration is ready for deployment");
        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &Settings {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_handler_new() {
        let config = Settings::default();
        let handler = ServeCommandHandler::new(config.clone());
        assert_eq!(handler.config(), &config);
    }

    #[tokio::test]
    async fn test_serve_handler_dry_run() {
        let handler = ServeCommandHandler::new(Settings::default());
        assert!(handler.execute(true).await.is_ok());
    }

    #[tokio::test]
    async fn test_serve_handler_dry_run_invalid_config() {
        let mut config = Settings::default();
        config.catalog.page_size = 0;
        let handler = ServeCommandHandler::new(config);

        assert!(handler.execute(true).await.is_err());
    }
}
