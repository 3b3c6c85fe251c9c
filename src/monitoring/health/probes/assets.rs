//! Asset CDN delivery probe
//!
//! Fetches one known asset. A non-2xx answer is critical, an empty body warns,
//! and latency is judged against `latency` (1500ms warning, 4000ms critical).

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use super::{Probe, ProbeKind, ProbeReport, elapsed_ms, latency_issue};
use crate::backend::{BackendResult, ContentBackend};
use crate::config::AssetProbeConfig;
use crate::monitoring::health::types::{Issue, Performance};

pub struct AssetDeliveryProbe {
    backend: Arc<dyn ContentBackend>,
    config: AssetProbeConfig,
}

impl AssetDeliveryProbe {
    pub fn new(backend: Arc<dyn ContentBackend>, config: AssetProbeConfig) -> Self {
        Self { backend, config }
    }
}

#[async_trait]
impl Probe for AssetDeliveryProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::AssetDelivery
    }

    fn endpoint(&self) -> Option<String> {
        Some(format!("GET {}", self.config.path))
    }

    async fn check(&self) -> BackendResult<ProbeReport> {
        let started = Instant::now();
        let asset = self.backend.fetch_asset(&self.config.path).await?;
        let latency = elapsed_ms(started);

        let mut issues = Vec::new();
        if !asset.is_success() {
            issues.push(
                Issue::critical(format!(
                    "Asset CDN returned HTTP {} for {}",
                    asset.status, self.config.path
                ))
                .with_suggestion("Verify the asset exists and the CDN origin is reachable"),
            );
        } else if asset.content_length == 0 {
            issues.push(
                Issue::warning(format!("Asset CDN served an empty body for {}", self.config.path))
                    .with_suggestion("Purge the CDN entry for the asset"),
            );
        }

        if let Some(issue) = latency_issue("Asset CDN", latency, &self.config.latency) {
            issues.push(issue);
        }

        let error_rate = if asset.is_success() { 0.0 } else { 1.0 };
        let hit_rate = asset.cache_hit.map(|hit| if hit { 1.0 } else { 0.0 });

        Ok(ProbeReport {
            performance: Performance::new(latency, error_rate).with_cache_hit_rate(hit_rate),
            issues,
        })
    }
}
