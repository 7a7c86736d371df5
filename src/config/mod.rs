//! Configuration management for mkbundle

pub mod schema;

pub use schema::{Config, RedistConfig, ShaderConfig, ToolsConfig};

use crate::error::{BundleError, BundleResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mkbundle")
            .join("tools.toml")
    }

    /// Load the tool configuration
    ///
    /// Unlike most settings files the tool paths have no usable defaults, so
    /// a missing file is an error.
    pub async fn load(&self) -> BundleResult<Config> {
        if !self.config_path.exists() {
            return Err(BundleError::ConfigNotFound(self.config_path.clone()));
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> BundleResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| BundleError::io(format!("reading config from {}", path.display()), e))?;

        let config: Config = toml::from_str(&content).map_err(|e| BundleError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!("Loaded tool configuration from {}", path.display());
        Ok(config)
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
