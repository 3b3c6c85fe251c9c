//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::monitoring::MonitoringSystem;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// Cloned into every worker; all fields are cheap to clone.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Engine configuration (shared read-only)
    pub config: Arc<Config>,
    /// The monitoring engine
    pub system: MonitoringSystem,
}

impl AppState {
    pub fn new(config: Config, system: MonitoringSystem) -> Self {
        Self {
            config: Arc::new(config),
            system,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
