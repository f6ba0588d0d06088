use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::ValidationResult;
use crate::Config;

/// Application lifecycle: loaded configuration plus startup/shutdown hooks
pub struct App {
    config: Arc<Config>,
    validation: ValidationResult,
}

impl App {
    /// Create a new application instance from the on-disk configuration
    pub fn new() -> Result<Self> {
        let (config, validation) = Config::load_validated()?;
        Ok(Self {
            config: Arc::new(config),
            validation,
        })
    }

    /// Create an application instance from an already loaded configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let validation = config.validate();
        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }
        Ok(Self {
            config: Arc::new(config),
            validation,
        })
    }

    /// Prepare the data directory
    pub fn initialize(&mut self) -> Result<()> {
        std::fs::create_dir_all(&self.config.config_dir).with_context(|| {
            format!(
                "Failed to create data directory {}",
                self.config.config_dir.display()
            )
        })?;

        tracing::info!(
            config_dir = %self.config.config_dir.display(),
            warnings = self.validation.warnings.len(),
            "Application initialized"
        );
        Ok(())
    }

    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down application");
        Ok(())
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Warnings collected while validating the configuration
    pub fn warnings(&self) -> &ValidationResult {
        &self.validation
    }
}
