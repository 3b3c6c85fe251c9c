//! Query cache layer probe
//!
//! Repeats one cheap query `samples` times through the cache layer and reads
//! the cache header of every answer.
//!
//! - hit rate below `hit_rate_critical` (0.1) is critical, below
//!   `hit_rate_warning` (0.5) warns
//! - no answer carrying a cache header leaves the hit rate unresolved, which
//!   warns
//! - any failed sample warns; all samples failing is critical
//! - average latency above `latency_warning_ms` (1000ms) warns

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use super::{Probe, ProbeKind, ProbeReport, elapsed_ms, mean};
use crate::backend::{BackendResult, ContentBackend};
use crate::config::CacheProbeConfig;
use crate::monitoring::health::types::{Issue, Performance};

pub struct CacheProbe {
    backend: Arc<dyn ContentBackend>,
    config: CacheProbeConfig,
}

impl CacheProbe {
    pub fn new(backend: Arc<dyn ContentBackend>, config: CacheProbeConfig) -> Self {
        Self { backend, config }
    }
}

#[async_trait]
impl Probe for CacheProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Cache
    }

    fn endpoint(&self) -> Option<String> {
        Some("GET /data/query (cache layer)".to_string())
    }

    async fn check(&self) -> BackendResult<ProbeReport> {
        let samples = self.config.samples.max(1);
        let mut latencies = Vec::with_capacity(samples as usize);
        let mut observed = Vec::with_capacity(samples as usize);
        let mut last_error = None;

        for _ in 0..samples {
            let started = Instant::now();
            match self.backend.cached_query(&self.config.query).await {
                Ok(response) => {
                    latencies.push(elapsed_ms(started));
                    if let Some(hit) = response.cache_hit {
                        observed.push(hit);
                    }
                }
                Err(err) => last_error = Some(err),
            }
        }

        let failures = samples as usize - latencies.len();
        if latencies.is_empty() {
            if let Some(err) = last_error {
                return Err(err);
            }
        }

        let error_rate = failures as f64 / samples as f64;
        let average = mean(&latencies);
        let hit_rate = if observed.is_empty() {
            None
        } else {
            Some(observed.iter().filter(|hit| **hit).count() as f64 / observed.len() as f64)
        };

        let mut issues = Vec::new();

        match hit_rate {
            None => issues.push(
                Issue::warning("Cache status could not be determined: no cache header returned")
                    .with_suggestion("Verify the cache layer is in front of the query API"),
            ),
            Some(rate) if rate < self.config.hit_rate_critical => issues.push(
                Issue::critical(format!(
                    "Cache hit rate {:.0}% is below {:.0}%",
                    rate * 100.0,
                    self.config.hit_rate_critical * 100.0
                ))
                .with_suggestion("Check cache configuration and invalidation rules"),
            ),
            Some(rate) if rate < self.config.hit_rate_warning => issues.push(
                Issue::warning(format!(
                    "Cache hit rate {:.0}% is below {:.0}%",
                    rate * 100.0,
                    self.config.hit_rate_warning * 100.0
                ))
                .with_suggestion("Review cache TTLs for frequently read queries"),
            ),
            Some(_) => {}
        }

        if failures > 0 {
            let mut issue = Issue::warning(format!(
                "{} of {} cache layer requests failed",
                failures, samples
            ));
            if let Some(err) = &last_error {
                issue = issue.with_suggestions(err.suggestions());
            }
            issues.push(issue);
        }

        if average > self.config.latency_warning_ms {
            issues.push(
                Issue::warning(format!(
                    "Cache layer response time {:.0}ms exceeds {:.0}ms",
                    average, self.config.latency_warning_ms
                ))
                .with_suggestion("Cached reads should be fast; check the cache tier"),
            );
        }

        Ok(ProbeReport {
            performance: Performance::new(average, error_rate).with_cache_hit_rate(hit_rate),
            issues,
        })
    }
}
