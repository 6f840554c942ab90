//! Configuration loading utilities
//!
//! Provides helper functions for loading configuration from various sources
//! with proper error handling and validation.

use crate::{Result, config::Settings, config::settings::default_config_path};
use std::path::Path;
use tracing::{debug, info, warn};

/// Configuration loader with multiple source support
#[derive(Debug)]
pub struct ConfigLoader {
    /// Default settings
    defaults: Settings,
}

impl ConfigLoader {
    /// Create new configuration loader
    pub fn new() -> Self {
        Self {
            defaults: Settings::default(),
        }
    }

    /// Load configuration with precedence order:
    /// 1. Environment variables (highest priority)
    /// 2. Configuration file
    /// 3. Default values (lowest priority)
    ///
    /// Command line overrides are applied by the binary after loading.
    /// When no file is given, the platform default location is tried.
    pub fn load(&self, config_file: Option<&Path>) -> Result<Settings> {
        let mut settings = self.defaults.clone();

        match config_file {
            Some(path) => {
                if path.exists() {
                    info!("Loading configuration from file: {:?}", path);
                    settings = load_file(path)?;
                } else {
                    warn!("Configuration file not found: {:?}, using defaults", path);
                }
            }
            None => {
                if let Some(path) = default_config_path()
                    && path.exists()
                {
                    info!("Loading configuration from file: {:?}", path);
                    settings = load_file(&path)?;
                }
            }
        }

        // Override with environment variables
        debug!("Applying environment variable overrides");
        settings.apply_env()?;

        // Validate final configuration
        settings.validate()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:?}", settings);

        Ok(settings)
    }

    /// Load configuration from environment only
    pub fn from_env_only(&self) -> Result<Settings> {
        let settings = Settings::from_env()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Get default configuration
    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn load_file(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| {
        crate::Error::Config(format!("Failed to parse {}: {}", path.display(), e))
    })
}
