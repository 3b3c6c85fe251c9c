//! Time-boxed snapshot store, one slot per mode
//!
//! Slots are swapped atomically; readers never block writers. Only completed
//! aggregations write here.

use arc_swap::ArcSwapOption;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::types::{HealthSnapshot, SnapshotMode};
use crate::config::SnapshotCacheConfig;
use crate::utils::error::{EngineError, Result};

#[derive(Debug)]
struct CachedSnapshot {
    snapshot: Arc<HealthSnapshot>,
    stored_at: Instant,
}

#[derive(Debug)]
struct Slot {
    entry: ArcSwapOption<CachedSnapshot>,
    ttl: Duration,
}

impl Slot {
    fn new(ttl: Duration) -> Self {
        Self {
            entry: ArcSwapOption::empty(),
            ttl,
        }
    }
}

/// TTL cache for the latest quick and full snapshots
#[derive(Debug)]
pub struct SnapshotCache {
    quick: Slot,
    full: Slot,
}

impl SnapshotCache {
    pub fn new(config: &SnapshotCacheConfig) -> Self {
        Self::with_ttls(config.quick_ttl(), config.full_ttl())
    }

    pub fn with_ttls(quick_ttl: Duration, full_ttl: Duration) -> Self {
        Self {
            quick: Slot::new(quick_ttl),
            full: Slot::new(full_ttl),
        }
    }

    fn slot(&self, mode: SnapshotMode) -> &Slot {
        match mode {
            SnapshotMode::Quick => &self.quick,
            SnapshotMode::Full => &self.full,
        }
    }

    pub fn ttl(&self, mode: SnapshotMode) -> Duration {
        self.slot(mode).ttl
    }

    /// Fresh snapshot for `mode`, if any.
    ///
    /// An entry that no longer agrees with itself is reported as
    /// [`EngineError::Cache`] so the caller can drop it and recompute.
    pub fn get(&self, mode: SnapshotMode) -> Result<Option<Arc<HealthSnapshot>>> {
        let slot = self.slot(mode);
        let Some(entry) = slot.entry.load_full() else {
            return Ok(None);
        };

        if entry.stored_at.elapsed() >= slot.ttl {
            debug!(mode = %mode, "cached snapshot expired");
            return Ok(None);
        }

        if entry.snapshot.mode != mode {
            return Err(EngineError::Cache(format!(
                "{} slot holds a {} snapshot",
                mode, entry.snapshot.mode
            )));
        }
        entry
            .snapshot
            .verify()
            .map_err(|reason| EngineError::Cache(format!("corrupted {} snapshot: {}", mode, reason)))?;

        Ok(Some(entry.snapshot.clone()))
    }

    pub fn put(&self, mode: SnapshotMode, snapshot: Arc<HealthSnapshot>) {
        self.slot(mode).entry.store(Some(Arc::new(CachedSnapshot {
            snapshot,
            stored_at: Instant::now(),
        })));
    }

    pub fn invalidate(&self, mode: SnapshotMode) {
        self.slot(mode).entry.store(None);
    }

    pub fn invalidate_all(&self) {
        self.invalidate(SnapshotMode::Quick);
        self.invalidate(SnapshotMode::Full);
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(&SnapshotCacheConfig::default())
    }
}
