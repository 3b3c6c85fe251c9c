//! # platform-health
//!
//! Health monitoring and diagnostic testing for a content platform: content
//! API, query cache layer, asset CDN, query layer and schema store.
//!
//! The engine answers two questions:
//!
//! - **Is the platform healthy right now?** [`MonitoringSystem::health`] returns
//!   a scored [`HealthSnapshot`] built from concurrent component probes, cached
//!   briefly per mode and shared between overlapping callers.
//! - **Is component X working?** [`MonitoringSystem::test`] runs one timed
//!   diagnostic test against one component.
//!
//! ## Example
//!
//! ```rust,no_run
//! use platform_health::{Config, HealthQuery, MonitoringSystem, SnapshotMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None).await?;
//!     let system = MonitoringSystem::from_config(&config.engine)?;
//!
//!     let outcome = system.health(HealthQuery::new(SnapshotMode::Full)).await?;
//!     println!("{:?}: {:?}", outcome.code, outcome.data);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod monitoring;
pub mod server;
pub mod utils;

pub use config::Config;
pub use monitoring::diagnostics::{TestRequest, TestResult, TestRunner, TestType};
pub use monitoring::health::{
    ComponentHealth, HealthAggregator, HealthSnapshot, Issue, SnapshotCache, SnapshotMode, Status,
};
pub use monitoring::{ExportFormat, ExportFormatter, HealthPayload, HealthQuery, MonitoringSystem, Outcome};
pub use utils::error::{EngineError, ResponseCode, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
