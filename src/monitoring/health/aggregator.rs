//! Snapshot aggregation
//!
//! Fans out to the registered probes with bounded concurrency under a global
//! deadline, merges the results and caches them per mode.
//!
//! Concurrent callers asking for the same mode share one in-flight pass. The
//! in-flight table only holds weak handles: when every waiter is dropped the
//! pass itself is dropped, cancelling its probes. While any waiter remains it
//! keeps running.

use futures::future::{BoxFuture, Shared, WeakShared};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::cache::SnapshotCache;
use super::probes::{ProbeRegistry, failed_component, run_probe};
use super::types::{ComponentHealth, HealthSnapshot, Issue, SnapshotMode};
use crate::config::AggregationConfig;

type SnapshotFuture = BoxFuture<'static, Arc<HealthSnapshot>>;

/// Entry point for health snapshots
#[derive(Clone)]
pub struct HealthAggregator {
    inner: Arc<AggregatorInner>,
}

struct AggregatorInner {
    registry: ProbeRegistry,
    cache: Arc<SnapshotCache>,
    config: AggregationConfig,
    probe_timeout: Duration,
    in_flight: Mutex<HashMap<SnapshotMode, WeakShared<SnapshotFuture>>>,
    passes: AtomicU64,
}

impl std::fmt::Debug for HealthAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthAggregator")
            .field("registry", &self.inner.registry)
            .field("config", &self.inner.config)
            .field("probe_timeout", &self.inner.probe_timeout)
            .finish()
    }
}

impl HealthAggregator {
    pub fn new(
        registry: ProbeRegistry,
        cache: Arc<SnapshotCache>,
        config: AggregationConfig,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(AggregatorInner {
                registry,
                cache,
                config,
                probe_timeout,
                in_flight: Mutex::new(HashMap::new()),
                passes: AtomicU64::new(0),
            }),
        }
    }

    pub fn registry(&self) -> &ProbeRegistry {
        &self.inner.registry
    }

    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.inner.cache
    }

    /// Number of probe fan-outs started so far
    pub fn passes(&self) -> u64 {
        self.inner.passes.load(Ordering::Relaxed)
    }

    /// Global bound for one pass in `mode`
    pub fn deadline_for(&self, mode: SnapshotMode) -> Duration {
        match mode {
            SnapshotMode::Quick => self.inner.config.quick_timeout(),
            SnapshotMode::Full => self.inner.config.full_timeout(),
        }
    }

    /// Current snapshot for `mode`.
    ///
    /// Served from cache unless `force` is set or the cached entry is stale or
    /// unreadable. A forced call still joins a pass already in flight for the
    /// same mode.
    pub async fn get_snapshot(&self, mode: SnapshotMode, force: bool) -> Arc<HealthSnapshot> {
        if !force {
            match self.inner.cache.get(mode) {
                Ok(Some(snapshot)) => {
                    debug!(mode = %mode, "serving cached snapshot");
                    return snapshot;
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(mode = %mode, error = %err, "dropping unreadable cached snapshot");
                    self.inner.cache.invalidate(mode);
                }
            }
        }

        self.join_or_start(mode).await
    }

    fn join_or_start(&self, mode: SnapshotMode) -> Shared<SnapshotFuture> {
        let mut in_flight = self.inner.in_flight.lock();

        if let Some(existing) = in_flight.get(&mode).and_then(WeakShared::upgrade) {
            debug!(mode = %mode, "joining in-flight aggregation");
            return existing;
        }

        let inner = self.inner.clone();
        let pass = async move { inner.aggregate(mode).await }.boxed().shared();
        if let Some(weak) = pass.downgrade() {
            in_flight.insert(mode, weak);
        }
        pass
    }
}

impl AggregatorInner {
    async fn aggregate(&self, mode: SnapshotMode) -> Arc<HealthSnapshot> {
        let pass = self.passes.fetch_add(1, Ordering::Relaxed) + 1;
        let probes = match mode {
            SnapshotMode::Quick => self.registry.select(&self.config.quick_components),
            SnapshotMode::Full => self.registry.all(),
        };
        let budget = match mode {
            SnapshotMode::Quick => self.config.quick_timeout(),
            SnapshotMode::Full => self.config.full_timeout(),
        };
        let deadline = Instant::now() + budget;
        let started = Instant::now();

        debug!(mode = %mode, pass, probes = probes.len(), "starting aggregation");

        let checks: Vec<BoxFuture<'static, ComponentHealth>> = probes
            .iter()
            .map(|probe| run_probe(probe.clone(), self.probe_timeout).boxed())
            .collect();
        let mut results =
            stream::iter(checks).buffer_unordered(self.config.max_concurrency.max(1));

        let mut components = BTreeMap::new();
        let mut timed_out = false;
        loop {
            match tokio::time::timeout_at(deadline, results.next()).await {
                Ok(Some(health)) => {
                    components.insert(health.component_name.clone(), health);
                }
                Ok(None) => break,
                Err(_) => {
                    timed_out = true;
                    break;
                }
            }
        }
        drop(results);

        if timed_out {
            for probe in &probes {
                let name = probe.component_name();
                if !components.contains_key(name) {
                    warn!(mode = %mode, component = name, "probe cut off by aggregation deadline");
                    components.insert(
                        name.to_string(),
                        failed_component(probe.as_ref(), deadline_issue(budget)),
                    );
                }
            }
        }

        let snapshot = Arc::new(HealthSnapshot::from_components(mode, components, timed_out));
        self.cache.put(mode, snapshot.clone());
        self.in_flight.lock().remove(&mode);

        info!(
            mode = %mode,
            pass,
            status = %snapshot.summary.status,
            score = snapshot.score,
            timed_out,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "aggregation complete"
        );
        snapshot
    }
}

fn deadline_issue(budget: Duration) -> Issue {
    Issue::critical(format!(
        "probe did not finish within the {}ms aggregation deadline",
        budget.as_millis()
    ))
    .with_suggestion("Check backend latency; the dependency may be hanging")
}
