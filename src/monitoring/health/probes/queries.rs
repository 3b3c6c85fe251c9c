//! Query layer probe
//!
//! Runs the configured query set concurrently. Error rate is failures over
//! queries run: any failure warns, `error_rate_critical` (0.5) and above is
//! critical. Average latency of the successful queries is judged against
//! `latency` (1000ms warning, 3000ms critical).

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;

use super::{Probe, ProbeKind, ProbeReport, elapsed_ms, latency_issue, mean};
use crate::backend::{BackendResult, ContentBackend};
use crate::config::QueryProbeConfig;
use crate::monitoring::health::types::{Issue, Performance};

pub struct QueryProbe {
    backend: Arc<dyn ContentBackend>,
    config: QueryProbeConfig,
}

impl QueryProbe {
    pub fn new(backend: Arc<dyn ContentBackend>, config: QueryProbeConfig) -> Self {
        Self { backend, config }
    }
}

#[async_trait]
impl Probe for QueryProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Query
    }

    fn endpoint(&self) -> Option<String> {
        Some("GET /data/query".to_string())
    }

    async fn check(&self) -> BackendResult<ProbeReport> {
        let runs = self.config.queries.iter().map(|query| async move {
            let started = Instant::now();
            let outcome = self.backend.query(query).await;
            (query.as_str(), elapsed_ms(started), outcome)
        });
        let results = join_all(runs).await;

        let total = results.len();
        let mut latencies = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for (query, latency, outcome) in results {
            match outcome {
                Ok(_) => latencies.push(latency),
                Err(err) => failures.push((query, err)),
            }
        }

        let error_rate = if total == 0 {
            0.0
        } else {
            failures.len() as f64 / total as f64
        };

        let mut issues = Vec::new();
        if let Some((query, err)) = failures.first() {
            let message = format!(
                "{} of {} queries failed; first failure `{}`: {}",
                failures.len(),
                total,
                query,
                err
            );
            let issue = if error_rate >= self.config.error_rate_critical {
                Issue::critical(message)
            } else {
                Issue::warning(message)
            };
            issues.push(issue.with_suggestions(err.suggestions()));
        }

        let average = mean(&latencies);
        if let Some(issue) = latency_issue("Query layer", average, &self.config.latency) {
            issues.push(issue);
        }

        Ok(ProbeReport {
            performance: Performance::new(average, error_rate),
            issues,
        })
    }
}
