//! Component probes
//!
//! A probe checks one backend dependency and reports a [`ComponentHealth`].
//! Probes may fail however they like internally; [`run_probe`] is the single
//! place that bounds them in time and converts every failure into a critical
//! component record, so nothing escapes into the aggregation.

mod assets;
mod cache;
mod connection;
mod queries;
mod schemas;

pub use assets::AssetDeliveryProbe;
pub use cache::CacheProbe;
pub use connection::ConnectionProbe;
pub use queries::QueryProbe;
pub use schemas::SchemaProbe;

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::types::{ComponentHealth, Issue, Performance};
use crate::backend::{BackendResult, ContentBackend};
use crate::config::{LatencyThresholds, ProbesConfig};
use crate::utils::error::{EngineError, Result};

/// The probe variants the engine knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    Connection,
    Cache,
    AssetDelivery,
    Query,
    Schema,
}

impl ProbeKind {
    pub const ALL: [ProbeKind; 5] = [
        ProbeKind::Connection,
        ProbeKind::Cache,
        ProbeKind::AssetDelivery,
        ProbeKind::Query,
        ProbeKind::Schema,
    ];

    /// Component name the probe reports under
    pub fn component_name(self) -> &'static str {
        match self {
            ProbeKind::Connection => "connection",
            ProbeKind::Cache => "cache",
            ProbeKind::AssetDelivery => "assets",
            ProbeKind::Query => "queries",
            ProbeKind::Schema => "schemas",
        }
    }

    pub fn from_component_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.component_name() == name)
    }

    /// Upstream components this one relies on
    pub fn dependencies(self) -> &'static [&'static str] {
        match self {
            ProbeKind::Connection => &[],
            ProbeKind::Cache => &["connection"],
            ProbeKind::AssetDelivery => &["connection"],
            ProbeKind::Query => &["connection", "cache"],
            ProbeKind::Schema => &["connection", "queries"],
        }
    }
}

/// Raw measurements from one probe run
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub performance: Performance,
    pub issues: Vec<Issue>,
}

/// A named check against one backend dependency
#[async_trait]
pub trait Probe: Send + Sync {
    fn kind(&self) -> ProbeKind;

    fn component_name(&self) -> &str {
        self.kind().component_name()
    }

    fn dependencies(&self) -> Vec<String> {
        self.kind()
            .dependencies()
            .iter()
            .map(|d| d.to_string())
            .collect()
    }

    /// Diagnostic identifier shown next to the component
    fn endpoint(&self) -> Option<String> {
        None
    }

    /// Perform the checks. A backend error means the dependency itself failed.
    async fn check(&self) -> BackendResult<ProbeReport>;
}

/// Run a probe within `timeout`, never failing past the probe contract
pub async fn run_probe(probe: Arc<dyn Probe>, timeout: Duration) -> ComponentHealth {
    let name = probe.component_name().to_string();
    let started = Instant::now();

    let outcome = AssertUnwindSafe(tokio::time::timeout(timeout, probe.check()))
        .catch_unwind()
        .await;

    let health = match outcome {
        Ok(Ok(Ok(report))) => ComponentHealth::new(
            name.clone(),
            probe.dependencies(),
            report.performance,
            report.issues,
            probe.endpoint(),
        ),
        Ok(Ok(Err(err))) => {
            let suggestions = err.suggestions();
            failed_component(
                probe.as_ref(),
                Issue::critical(format!("{} check failed: {}", name, err))
                    .with_suggestions(suggestions),
            )
        }
        Ok(Err(_)) => {
            warn!(component = %name, "probe exceeded its {}ms timeout", timeout.as_millis());
            failed_component(probe.as_ref(), probe_timeout_issue(timeout))
        }
        Err(panic) => {
            warn!(component = %name, "probe panicked");
            failed_component(
                probe.as_ref(),
                Issue::critical(format!("probe failed: {}", panic_message(panic.as_ref()))),
            )
        }
    };

    debug!(
        component = %name,
        status = %health.status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "probe finished"
    );
    health
}

/// Critical record for a probe that produced no measurements
pub fn failed_component(probe: &dyn Probe, issue: Issue) -> ComponentHealth {
    ComponentHealth::new(
        probe.component_name(),
        probe.dependencies(),
        Performance::failed(),
        vec![issue],
        probe.endpoint(),
    )
}

pub(crate) fn probe_timeout_issue(timeout: Duration) -> Issue {
    Issue::critical(format!("probe timed out after {}ms", timeout.as_millis()))
        .with_suggestion("Check backend latency; the dependency may be hanging")
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub(crate) fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

/// Latency check shared by the probes; `None` when within bounds
pub(crate) fn latency_issue(
    subject: &str,
    latency_ms: f64,
    thresholds: &LatencyThresholds,
) -> Option<Issue> {
    if latency_ms > thresholds.critical_ms {
        Some(
            Issue::critical(format!(
                "{} response time {:.0}ms exceeds {:.0}ms",
                subject, latency_ms, thresholds.critical_ms
            ))
            .with_suggestion("Check backend load and recent deploys"),
        )
    } else if latency_ms > thresholds.warning_ms {
        Some(
            Issue::warning(format!(
                "{} response time {:.0}ms exceeds {:.0}ms",
                subject, latency_ms, thresholds.warning_ms
            ))
            .with_suggestion("Monitor latency; consider caching hot queries"),
        )
    } else {
        None
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Registered probes, unique by component name
#[derive(Clone, Default)]
pub struct ProbeRegistry {
    probes: Vec<Arc<dyn Probe>>,
}

impl std::fmt::Debug for ProbeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.probes.iter().map(|p| p.component_name()))
            .finish()
    }
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard five probes against one backend
    pub fn with_defaults(config: &ProbesConfig, backend: Arc<dyn ContentBackend>) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(ConnectionProbe::new(
            backend.clone(),
            config.connection.clone(),
        )))?;
        registry.register(Arc::new(CacheProbe::new(backend.clone(), config.cache.clone())))?;
        registry.register(Arc::new(AssetDeliveryProbe::new(
            backend.clone(),
            config.assets.clone(),
        )))?;
        registry.register(Arc::new(QueryProbe::new(
            backend.clone(),
            config.queries.clone(),
        )))?;
        registry.register(Arc::new(SchemaProbe::new(backend, config.schemas.clone())))?;
        Ok(registry)
    }

    pub fn register(&mut self, probe: Arc<dyn Probe>) -> Result<()> {
        if self.get(probe.component_name()).is_some() {
            return Err(EngineError::Config(format!(
                "a probe for component '{}' is already registered",
                probe.component_name()
            )));
        }
        debug!(component = probe.component_name(), "registered probe");
        self.probes.push(probe);
        Ok(())
    }

    pub fn get(&self, component_name: &str) -> Option<&Arc<dyn Probe>> {
        self.probes
            .iter()
            .find(|p| p.component_name() == component_name)
    }

    /// Probes whose component is listed in `names`, in registration order
    pub fn select(&self, names: &[String]) -> Vec<Arc<dyn Probe>> {
        self.probes
            .iter()
            .filter(|p| names.iter().any(|n| n == p.component_name()))
            .cloned()
            .collect()
    }

    pub fn all(&self) -> Vec<Arc<dyn Probe>> {
        self.probes.clone()
    }

    pub fn component_names(&self) -> Vec<String> {
        self.probes
            .iter()
            .map(|p| p.component_name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}
