//! Aggregation and snapshot cache configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fan-out settings for snapshot aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Maximum number of probes running at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Hard bound for a quick aggregation, in milliseconds
    #[serde(default = "default_quick_timeout_ms")]
    pub quick_timeout_ms: u64,
    /// Hard bound for a full aggregation, in milliseconds
    #[serde(default = "default_full_timeout_ms")]
    pub full_timeout_ms: u64,
    /// Components probed in quick mode
    #[serde(default = "default_quick_components")]
    pub quick_components: Vec<String>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            quick_timeout_ms: default_quick_timeout_ms(),
            full_timeout_ms: default_full_timeout_ms(),
            quick_components: default_quick_components(),
        }
    }
}

impl AggregationConfig {
    pub fn quick_timeout(&self) -> Duration {
        Duration::from_millis(self.quick_timeout_ms)
    }

    pub fn full_timeout(&self) -> Duration {
        Duration::from_millis(self.full_timeout_ms)
    }
}

/// Snapshot cache time-to-live per mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotCacheConfig {
    #[serde(default = "default_quick_ttl_secs")]
    pub quick_ttl_secs: u64,
    #[serde(default = "default_full_ttl_secs")]
    pub full_ttl_secs: u64,
}

impl Default for SnapshotCacheConfig {
    fn default() -> Self {
        Self {
            quick_ttl_secs: default_quick_ttl_secs(),
            full_ttl_secs: default_full_ttl_secs(),
        }
    }
}

impl SnapshotCacheConfig {
    pub fn quick_ttl(&self) -> Duration {
        Duration::from_secs(self.quick_ttl_secs)
    }

    pub fn full_ttl(&self) -> Duration {
        Duration::from_secs(self.full_ttl_secs)
    }
}

fn default_max_concurrency() -> usize {
    8
}

fn default_quick_components() -> Vec<String> {
    vec!["connection".to_string(), "cache".to_string()]
}
