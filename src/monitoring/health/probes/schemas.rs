//! Schema store probe
//!
//! A dataset with no documents or no document types is critical. Every
//! configured expected type that is missing is listed in one warning.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use super::{Probe, ProbeKind, ProbeReport, elapsed_ms, mean};
use crate::backend::{BackendResult, ContentBackend};
use crate::config::SchemaProbeConfig;
use crate::monitoring::health::types::{Issue, Performance};

pub struct SchemaProbe {
    backend: Arc<dyn ContentBackend>,
    config: SchemaProbeConfig,
}

impl SchemaProbe {
    pub fn new(backend: Arc<dyn ContentBackend>, config: SchemaProbeConfig) -> Self {
        Self { backend, config }
    }
}

#[async_trait]
impl Probe for SchemaProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Schema
    }

    fn endpoint(&self) -> Option<String> {
        Some("query array::unique(*[]._type)".to_string())
    }

    async fn check(&self) -> BackendResult<ProbeReport> {
        let started = Instant::now();
        let types = self.backend.document_types().await?;
        let types_latency = elapsed_ms(started);

        let started = Instant::now();
        let count = self.backend.document_count().await?;
        let count_latency = elapsed_ms(started);

        let mut issues = Vec::new();
        if count == 0 {
            issues.push(
                Issue::critical("Dataset contains no documents")
                    .with_suggestion("Verify backend.dataset points at the populated dataset"),
            );
        }
        if types.is_empty() {
            issues.push(
                Issue::critical("No document types found in dataset")
                    .with_suggestion("Check that schemas have been deployed"),
            );
        }

        let present: BTreeSet<&str> = types.iter().map(String::as_str).collect();
        let missing: Vec<&str> = self
            .config
            .expected_types
            .iter()
            .map(String::as_str)
            .filter(|t| !present.contains(t))
            .collect();
        if !missing.is_empty() {
            issues.push(
                Issue::warning(format!(
                    "Missing expected document types: {}",
                    missing.join(", ")
                ))
                .with_suggestion("Deploy the latest schema or create seed documents"),
            );
        }

        Ok(ProbeReport {
            performance: Performance::new(mean(&[types_latency, count_latency]), 0.0),
            issues,
        })
    }
}
