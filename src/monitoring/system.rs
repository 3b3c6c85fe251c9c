//! Core MonitoringSystem implementation
//!
//! The two contracts the engine exposes to its callers: a health snapshot
//! query and a component test request. Transports (HTTP, CLI) sit on top of
//! this and only translate.

use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::diagnostics::{TestRequest, TestResult, TestRunner};
use super::export::{ExportFormat, ExportFormatter, ExportedReport};
use super::health::{HealthAggregator, HealthSnapshot, ProbeRegistry, SnapshotCache, SnapshotMode};
use crate::backend::{ContentBackend, HttpBackend};
use crate::config::EngineConfig;
use crate::utils::error::{ResponseCode, Result};

/// Parameters of a health query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HealthQuery {
    #[serde(default = "default_mode")]
    pub mode: SnapshotMode,
    #[serde(default)]
    pub force: bool,
    /// Route through the exporter instead of returning the structure
    #[serde(default)]
    pub format: Option<ExportFormat>,
}

fn default_mode() -> SnapshotMode {
    SnapshotMode::Quick
}

impl Default for HealthQuery {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            force: false,
            format: None,
        }
    }
}

impl HealthQuery {
    pub fn new(mode: SnapshotMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn exported(mut self, format: ExportFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Snapshot as structure or as a download
#[derive(Debug, Clone, PartialEq)]
pub enum HealthPayload {
    Snapshot(Arc<HealthSnapshot>),
    Export(ExportedReport),
}

/// A successfully produced answer and the code it is reported with
///
/// `code` is [`ResponseCode::Ok`] or [`ResponseCode::Timeout`]; a timed-out
/// answer still carries the best-effort data.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub code: ResponseCode,
    pub data: T,
}

impl<T> Outcome<T> {
    fn new(timed_out: bool, data: T) -> Self {
        let code = if timed_out {
            ResponseCode::Timeout
        } else {
            ResponseCode::Ok
        };
        Self { code, data }
    }
}

/// Main monitoring system
#[derive(Clone, Debug)]
pub struct MonitoringSystem {
    aggregator: HealthAggregator,
    runner: Arc<TestRunner>,
}

impl MonitoringSystem {
    /// Build the engine against the configured HTTP backend
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let backend: Arc<dyn ContentBackend> = Arc::new(HttpBackend::new(&config.backend)?);
        Self::new(config, backend)
    }

    /// Build the engine with the standard probe set against `backend`
    pub fn new(config: &EngineConfig, backend: Arc<dyn ContentBackend>) -> Result<Self> {
        let registry = ProbeRegistry::with_defaults(&config.probes, backend.clone())?;
        let runner = TestRunner::new(backend, config.testing.clone(), config.probes.clone())?;
        let system = Self::from_parts(config, registry, runner);

        info!(
            components = ?system.aggregator.registry().component_names(),
            "monitoring system initialized"
        );
        Ok(system)
    }

    /// Build the engine from an explicit probe registry
    pub fn from_parts(config: &EngineConfig, registry: ProbeRegistry, runner: TestRunner) -> Self {
        let cache = Arc::new(SnapshotCache::new(&config.cache));
        let aggregator = HealthAggregator::new(
            registry,
            cache,
            config.aggregation.clone(),
            config.probes.probe_timeout(),
        );

        Self {
            aggregator,
            runner: Arc::new(runner),
        }
    }

    pub fn aggregator(&self) -> &HealthAggregator {
        &self.aggregator
    }

    pub fn runner(&self) -> &TestRunner {
        &self.runner
    }

    /// Health snapshot query
    ///
    /// The code follows `snapshot.timed_out`, so a cached cut-off snapshot
    /// keeps reporting [`ResponseCode::Timeout`] until it expires.
    pub async fn health(&self, query: HealthQuery) -> Result<Outcome<HealthPayload>> {
        let snapshot = self.aggregator.get_snapshot(query.mode, query.force).await;
        let timed_out = snapshot.timed_out;

        let payload = match query.format {
            None => HealthPayload::Snapshot(snapshot),
            Some(format) => HealthPayload::Export(ExportFormatter::export(&snapshot, format)?),
        };

        Ok(Outcome::new(timed_out, payload))
    }

    /// Component test request
    pub async fn test(&self, request: TestRequest) -> Result<Outcome<TestResult>> {
        let result = self.runner.run(&request).await?;
        Ok(Outcome::new(result.timed_out, result))
    }

    /// Drop both cached snapshots
    pub fn invalidate_cache(&self) {
        info!("invalidating cached snapshots");
        self.aggregator.cache().invalidate_all();
    }
}
