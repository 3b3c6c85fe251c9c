//! Content API connection probe
//!
//! Thresholds: round trip above `latency.warning_ms` (default 1000ms) warns,
//! above `latency.critical_ms` (default 3000ms) is critical. An unreachable API
//! is critical.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use super::{Probe, ProbeKind, ProbeReport, elapsed_ms, latency_issue};
use crate::backend::{BackendResult, ContentBackend};
use crate::config::ConnectionProbeConfig;
use crate::monitoring::health::types::Performance;

pub struct ConnectionProbe {
    backend: Arc<dyn ContentBackend>,
    config: ConnectionProbeConfig,
}

impl ConnectionProbe {
    pub fn new(backend: Arc<dyn ContentBackend>, config: ConnectionProbeConfig) -> Self {
        Self { backend, config }
    }
}

#[async_trait]
impl Probe for ConnectionProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Connection
    }

    fn endpoint(&self) -> Option<String> {
        Some("GET /ping".to_string())
    }

    async fn check(&self) -> BackendResult<ProbeReport> {
        let started = Instant::now();
        self.backend.ping().await?;
        let latency = elapsed_ms(started);

        let issues = latency_issue("Content API", latency, &self.config.latency)
            .into_iter()
            .collect();

        Ok(ProbeReport {
            performance: Performance::new(latency, 0.0),
            issues,
        })
    }
}
