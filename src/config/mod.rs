//! Configuration management for the health engine
//!
//! Configuration is read from a YAML file, then overridden by `HEALTH_*`
//! environment variables (a `.env` file is honoured), then validated.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{EngineError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the health engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Engine configuration
    pub engine: EngineConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml_str(&content)?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let engine: EngineConfig = serde_yaml::from_str(content)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        let config = Self { engine };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from defaults plus environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut config = Self::default();
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise from the environment alone.
    /// Environment overrides always win over file values.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file loaded: {}", e);
        }

        let mut config = match path {
            Some(path) => Self::from_file(path).await?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `HEALTH_*` overrides using the given variable lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let engine = &mut self.engine;

        if let Some(host) = lookup("HEALTH_HOST") {
            engine.server.host = host;
        }
        if let Some(port) = lookup("HEALTH_PORT") {
            engine.server.port = port
                .parse()
                .map_err(|e| EngineError::Config(format!("Invalid HEALTH_PORT: {}", e)))?;
        }
        if let Some(url) = lookup("HEALTH_API_URL") {
            engine.backend.api_url = url;
        }
        if let Some(url) = lookup("HEALTH_CDN_URL") {
            engine.backend.cdn_url = url;
        }
        if let Some(url) = lookup("HEALTH_ASSET_URL") {
            engine.backend.asset_url = url;
        }
        if let Some(dataset) = lookup("HEALTH_DATASET") {
            engine.backend.dataset = dataset;
        }
        if let Some(version) = lookup("HEALTH_API_VERSION") {
            engine.backend.api_version = version;
        }
        if let Some(token) = lookup("HEALTH_API_TOKEN") {
            engine.backend.token = Some(token);
        }
        if let Some(level) = lookup("HEALTH_LOG_LEVEL") {
            engine.logging.level = level;
        }
        if let Some(json) = lookup("HEALTH_LOG_JSON") {
            engine.logging.json = json
                .parse()
                .map_err(|e| EngineError::Config(format!("Invalid HEALTH_LOG_JSON: {}", e)))?;
        }

        Ok(())
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.engine.server
    }

    /// Get backend configuration
    pub fn backend(&self) -> &BackendConfig {
        &self.engine.backend
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");
        self.engine
            .validate()
            .map_err(|e| EngineError::Config(format!("Invalid configuration: {}", e)))
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.engine)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
