//! Health monitoring and diagnostic testing
//!
//! This module provides the health snapshot path (probes, aggregation, cache),
//! on-demand component tests, and snapshot export.

pub mod diagnostics;
pub mod export;
pub mod health;
mod system;

pub use export::{ExportFormat, ExportFormatter, ExportedReport};
pub use system::{HealthPayload, HealthQuery, MonitoringSystem, Outcome};
