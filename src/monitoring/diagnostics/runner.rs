//! On-demand diagnostic tests
//!
//! Every call runs on its own: nothing is cached or shared between tests, and
//! two identical concurrent requests both hit the backend. Requests are
//! validated before anything is dispatched; after that, every failure mode
//! (backend error, timeout, panic) ends up in a `success: false` result with
//! its timing fields filled.

use chrono::Utc;
use futures::FutureExt;
use serde_json::{Value, json};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

use super::guard::QueryGuard;
use super::types::{TestPlan, TestRequest, TestResult, TestType};
use crate::backend::{BackendError, BackendResult, ContentBackend};
use crate::config::{ProbesConfig, TestingConfig};
use crate::monitoring::health::ProbeKind;
use crate::monitoring::health::probes::panic_message;
use crate::utils::error::{EngineError, Result};

/// What a test measured before it is stamped with timing
struct Measured {
    success: bool,
    message: String,
    response_time: Option<u64>,
    details: Option<Value>,
}

impl Measured {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            response_time: None,
            details: None,
        }
    }
}

/// Executes single diagnostic tests against the backend
pub struct TestRunner {
    backend: Arc<dyn ContentBackend>,
    config: TestingConfig,
    probes: ProbesConfig,
    guard: QueryGuard,
}

impl std::fmt::Debug for TestRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestRunner")
            .field("backend", &self.backend)
            .field("config", &self.config)
            .finish()
    }
}

impl TestRunner {
    pub fn new(
        backend: Arc<dyn ContentBackend>,
        config: TestingConfig,
        probes: ProbesConfig,
    ) -> Result<Self> {
        let guard = QueryGuard::new(&config.custom_query)?;
        Ok(Self {
            backend,
            config,
            probes,
            guard,
        })
    }

    /// Validate a request without running it
    pub fn plan(&self, request: &TestRequest) -> Result<TestPlan> {
        let kind = ProbeKind::from_component_name(&request.component_name).ok_or_else(|| {
            let known: Vec<&str> = ProbeKind::ALL.iter().map(|k| k.component_name()).collect();
            EngineError::validation(format!(
                "unknown component '{}', expected one of {}",
                request.component_name,
                known.join(", ")
            ))
        })?;

        let query = match (request.test_type, request.custom_query.as_deref()) {
            (TestType::Custom, None) => {
                return Err(EngineError::validation(
                    "customQuery is required for custom tests",
                ));
            }
            (TestType::Custom, Some(query)) => {
                self.guard.check(query)?;
                Some(query.to_string())
            }
            (other, Some(_)) => {
                return Err(EngineError::validation(format!(
                    "customQuery is only accepted for custom tests, not {}",
                    other
                )));
            }
            (_, None) => None,
        };

        Ok(TestPlan {
            kind,
            test_type: request.test_type,
            query,
        })
    }

    /// Validate and run one test
    pub async fn run(&self, request: &TestRequest) -> Result<TestResult> {
        let plan = self.plan(request)?;
        Ok(self.execute(plan).await)
    }

    /// Run a validated test; never fails
    pub async fn execute(&self, plan: TestPlan) -> TestResult {
        let test_id = Uuid::new_v4();
        let bound = self.config.test_timeout();
        debug!(%test_id, component = plan.kind.component_name(), test_type = %plan.test_type, "running test");

        let start_time = Utc::now();
        let started = Instant::now();
        let outcome = AssertUnwindSafe(tokio::time::timeout(bound, self.dispatch(&plan)))
            .catch_unwind()
            .await;
        let duration_ms = started.elapsed().as_millis() as u64;
        let end_time = Utc::now();

        let (measured, timed_out) = match outcome {
            Ok(Ok(Ok(measured))) => (measured, false),
            Ok(Ok(Err(err))) => (Measured::failed(err.to_string()), false),
            Ok(Err(_)) => (
                Measured::failed(format!("test timed out after {}ms", bound.as_millis())),
                true,
            ),
            Err(panic) => (
                Measured::failed(format!("test failed: {}", panic_message(panic.as_ref()))),
                false,
            ),
        };

        info!(
            %test_id,
            component = plan.kind.component_name(),
            test_type = %plan.test_type,
            success = measured.success,
            timed_out,
            duration_ms,
            "diagnostic test finished"
        );

        TestResult {
            test_id,
            component_name: plan.kind.component_name().to_string(),
            test_type: plan.test_type,
            success: measured.success,
            message: measured.message,
            duration_ms,
            start_time,
            end_time,
            response_time: measured.response_time,
            timed_out,
            details: measured.details,
        }
    }

    async fn dispatch(&self, plan: &TestPlan) -> BackendResult<Measured> {
        match (plan.test_type, plan.query.as_deref()) {
            (TestType::Connectivity, _) => self.connectivity(plan.kind).await,
            (TestType::Performance, _) => self.performance(plan.kind).await,
            (TestType::DataIntegrity, _) => self.data_integrity(plan.kind).await,
            (TestType::Custom, Some(query)) => self.custom(plan.kind, query).await,
            (TestType::Custom, None) => Ok(Measured::failed("custom test without a query")),
        }
    }

    /// The representative call for a component, checked for well-formedness
    async fn touch(&self, kind: ProbeKind) -> BackendResult<()> {
        match kind {
            ProbeKind::Connection => self.backend.ping().await,
            ProbeKind::Cache => self
                .backend
                .cached_query(&self.probes.cache.query)
                .await
                .map(|_| ()),
            ProbeKind::AssetDelivery => {
                let asset = self.backend.fetch_asset(&self.probes.assets.path).await?;
                if asset.is_success() {
                    Ok(())
                } else {
                    Err(BackendError::Status {
                        status: asset.status,
                        message: format!("asset {} not served", self.probes.assets.path),
                    })
                }
            }
            ProbeKind::Query => self.backend.document_count().await.map(|_| ()),
            ProbeKind::Schema => self.backend.document_types().await.map(|_| ()),
        }
    }

    async fn connectivity(&self, kind: ProbeKind) -> BackendResult<Measured> {
        let bound = self.config.connectivity_timeout();
        let started = Instant::now();

        match tokio::time::timeout(bound, self.touch(kind)).await {
            Ok(result) => {
                result?;
                let elapsed = started.elapsed().as_millis() as u64;
                Ok(Measured {
                    success: true,
                    message: format!("{} responded in {}ms", kind.component_name(), elapsed),
                    response_time: Some(elapsed),
                    details: None,
                })
            }
            Err(_) => Ok(Measured {
                success: false,
                message: format!(
                    "{} did not respond within {}ms",
                    kind.component_name(),
                    bound.as_millis()
                ),
                response_time: None,
                details: None,
            }),
        }
    }

    async fn performance(&self, kind: ProbeKind) -> BackendResult<Measured> {
        let iterations = self.config.performance_iterations.max(1);
        let threshold = Duration::from_millis(self.config.performance_threshold_ms);

        let mut latencies = Vec::with_capacity(iterations as usize);
        let mut last_error = None;
        for _ in 0..iterations {
            let started = Instant::now();
            match self.touch(kind).await {
                Ok(()) => latencies.push(started.elapsed()),
                Err(err) => last_error = Some(err),
            }
        }

        if latencies.is_empty() {
            return Err(last_error.unwrap_or_else(|| {
                BackendError::Unreachable("no performance samples collected".to_string())
            }));
        }

        let failures = iterations as usize - latencies.len();
        let average = latencies.iter().sum::<Duration>() / latencies.len() as u32;
        let min = latencies.iter().min().copied().unwrap_or_default();
        let max = latencies.iter().max().copied().unwrap_or_default();
        let average_ms = average.as_millis() as u64;

        let success = failures == 0 && average < threshold;
        let message = if failures > 0 {
            format!("{} of {} calls failed", failures, iterations)
        } else if success {
            format!(
                "average {}ms over {} calls, under {}ms",
                average_ms,
                iterations,
                threshold.as_millis()
            )
        } else {
            format!(
                "average {}ms over {} calls exceeds {}ms",
                average_ms,
                iterations,
                threshold.as_millis()
            )
        };

        Ok(Measured {
            success,
            message,
            response_time: Some(average_ms),
            details: Some(json!({
                "iterations": iterations,
                "failures": failures,
                "averageMs": average_ms,
                "minMs": min.as_millis() as u64,
                "maxMs": max.as_millis() as u64,
                "thresholdMs": threshold.as_millis() as u64,
            })),
        })
    }

    async fn data_integrity(&self, kind: ProbeKind) -> BackendResult<Measured> {
        let started = Instant::now();

        let (success, message, details) = match kind {
            ProbeKind::Connection | ProbeKind::Query => {
                let count = self.backend.document_count().await?;
                let message = if count > 0 {
                    format!("dataset holds {} documents", count)
                } else {
                    "dataset is empty".to_string()
                };
                (count > 0, message, json!({ "documentCount": count }))
            }
            ProbeKind::Cache => {
                let query = &self.probes.cache.query;
                let origin = self.backend.query(query).await?;
                let cached = self.backend.cached_query(query).await?;
                let agree = origin.result == cached.result;
                let message = if agree {
                    "cached and origin results agree".to_string()
                } else {
                    "cached result differs from origin".to_string()
                };
                (
                    agree,
                    message,
                    json!({ "query": query, "cacheHit": cached.cache_hit }),
                )
            }
            ProbeKind::AssetDelivery => {
                let path = &self.probes.assets.path;
                let asset = self.backend.fetch_asset(path).await?;
                let success = asset.is_success()
                    && asset.content_length > 0
                    && asset.content_type.is_some();
                let message = if success {
                    format!("{} served {} bytes", path, asset.content_length)
                } else if !asset.is_success() {
                    format!("{} returned HTTP {}", path, asset.status)
                } else if asset.content_length == 0 {
                    format!("{} served an empty body", path)
                } else {
                    format!("{} served without a content type", path)
                };
                (
                    success,
                    message,
                    json!({
                        "status": asset.status,
                        "contentType": asset.content_type,
                        "contentLength": asset.content_length,
                    }),
                )
            }
            ProbeKind::Schema => {
                let types = self.backend.document_types().await?;
                let count = self.backend.document_count().await?;
                let missing: Vec<&String> = self
                    .probes
                    .schemas
                    .expected_types
                    .iter()
                    .filter(|t| !types.contains(t))
                    .collect();
                let success = !types.is_empty() && count > 0 && missing.is_empty();
                let message = if types.is_empty() || count == 0 {
                    "dataset has no documents or document types".to_string()
                } else if !missing.is_empty() {
                    format!(
                        "missing expected document types: {}",
                        missing
                            .iter()
                            .map(|t| t.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )
                } else {
                    format!("{} document types across {} documents", types.len(), count)
                };
                (
                    success,
                    message,
                    json!({
                        "documentTypes": types,
                        "documentCount": count,
                        "missingTypes": missing,
                    }),
                )
            }
        };

        Ok(Measured {
            success,
            message,
            response_time: Some(started.elapsed().as_millis() as u64),
            details: Some(details),
        })
    }

    async fn custom(&self, kind: ProbeKind, query: &str) -> BackendResult<Measured> {
        let started = Instant::now();
        let response = match kind {
            ProbeKind::Cache => self.backend.cached_query(query).await?,
            _ => self.backend.query(query).await?,
        };
        let elapsed = started.elapsed().as_millis() as u64;

        Ok(Measured {
            success: true,
            message: format!("query executed in {}ms", elapsed),
            response_time: Some(elapsed),
            details: Some(json!({
                "result": response.result,
                "serverMs": response.server_ms,
                "cacheHit": response.cache_hit,
            })),
        })
    }
}
