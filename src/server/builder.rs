//! Server builder and run_server function

use crate::config::Config;
use crate::monitoring::MonitoringSystem;
use crate::server::server::HttpServer;
use crate::utils::error::{EngineError, Result};
use tracing::info;

/// Server builder for easier configuration
#[derive(Default)]
pub struct ServerBuilder {
    config: Option<Config>,
    system: Option<MonitoringSystem>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a prebuilt engine instead of one against the configured backend
    pub fn with_system(mut self, system: MonitoringSystem) -> Self {
        self.system = Some(system);
        self
    }

    pub fn build(self) -> Result<HttpServer> {
        let config = self
            .config
            .ok_or_else(|| EngineError::Config("Configuration is required".to_string()))?;

        match self.system {
            Some(system) => Ok(HttpServer::with_system(&config, system)),
            None => HttpServer::new(&config),
        }
    }
}

/// Load configuration and serve until shutdown
pub async fn run_server(config: Config) -> Result<()> {
    info!(
        "Starting platform health server v{} on {}",
        crate::VERSION,
        config.server().address()
    );
    info!("   GET  /health?mode=quick|full&force=bool&format=json|csv");
    info!("   POST /health/test");
    info!("   POST /health/cache/invalidate");
    info!("   GET  /version");

    ServerBuilder::new().with_config(config).build()?.start().await
}

