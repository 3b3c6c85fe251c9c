//! Probe thresholds
//!
//! Every threshold here is compared with a strict `>` (latency) or `<` (hit
//! rate) unless noted otherwise, so a value sitting exactly on a threshold does
//! not raise an issue.

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the component probe set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbesConfig {
    /// Upper bound for a single probe, in milliseconds
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    #[serde(default)]
    pub connection: ConnectionProbeConfig,
    #[serde(default)]
    pub cache: CacheProbeConfig,
    #[serde(default)]
    pub assets: AssetProbeConfig,
    #[serde(default)]
    pub queries: QueryProbeConfig,
    #[serde(default)]
    pub schemas: SchemaProbeConfig,
}

impl Default for ProbesConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: default_probe_timeout_ms(),
            connection: ConnectionProbeConfig::default(),
            cache: CacheProbeConfig::default(),
            assets: AssetProbeConfig::default(),
            queries: QueryProbeConfig::default(),
            schemas: SchemaProbeConfig::default(),
        }
    }
}

impl ProbesConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Warning/critical latency pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyThresholds {
    pub warning_ms: f64,
    pub critical_ms: f64,
}

impl LatencyThresholds {
    pub const fn new(warning_ms: f64, critical_ms: f64) -> Self {
        Self {
            warning_ms,
            critical_ms,
        }
    }
}

/// Content API round trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProbeConfig {
    #[serde(default = "default_connection_latency")]
    pub latency: LatencyThresholds,
}

impl Default for ConnectionProbeConfig {
    fn default() -> Self {
        Self {
            latency: default_connection_latency(),
        }
    }
}

/// Query cache layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheProbeConfig {
    /// Query repeated against the cache layer
    #[serde(default = "default_cache_query")]
    pub query: String,
    /// Number of repetitions used to estimate the hit rate
    #[serde(default = "default_cache_samples")]
    pub samples: u32,
    /// Hit rate below this raises a warning
    #[serde(default = "default_hit_rate_warning")]
    pub hit_rate_warning: f64,
    /// Hit rate below this raises a critical issue
    #[serde(default = "default_hit_rate_critical")]
    pub hit_rate_critical: f64,
    /// Average latency above this raises a warning
    #[serde(default = "default_cache_latency_warning_ms")]
    pub latency_warning_ms: f64,
}

impl Default for CacheProbeConfig {
    fn default() -> Self {
        Self {
            query: default_cache_query(),
            samples: default_cache_samples(),
            hit_rate_warning: default_hit_rate_warning(),
            hit_rate_critical: default_hit_rate_critical(),
            latency_warning_ms: default_cache_latency_warning_ms(),
        }
    }
}

/// Asset CDN delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetProbeConfig {
    /// Path of a small, always-present asset
    #[serde(default = "default_asset_path")]
    pub path: String,
    #[serde(default = "default_asset_latency")]
    pub latency: LatencyThresholds,
}

impl Default for AssetProbeConfig {
    fn default() -> Self {
        Self {
            path: default_asset_path(),
            latency: default_asset_latency(),
        }
    }
}

/// Representative query set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryProbeConfig {
    #[serde(default = "default_query_set")]
    pub queries: Vec<String>,
    /// Error rate at or above this is critical; anything above zero warns
    #[serde(default = "default_error_rate_critical")]
    pub error_rate_critical: f64,
    #[serde(default = "default_query_latency")]
    pub latency: LatencyThresholds,
}

impl Default for QueryProbeConfig {
    fn default() -> Self {
        Self {
            queries: default_query_set(),
            error_rate_critical: default_error_rate_critical(),
            latency: default_query_latency(),
        }
    }
}

/// Schema store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaProbeConfig {
    /// Document types that must exist in the dataset
    #[serde(default)]
    pub expected_types: Vec<String>,
}

fn default_connection_latency() -> LatencyThresholds {
    LatencyThresholds::new(1_000.0, 3_000.0)
}

fn default_cache_query() -> String {
    "count(*)".to_string()
}

fn default_cache_samples() -> u32 {
    3
}

fn default_hit_rate_warning() -> f64 {
    0.5
}

fn default_hit_rate_critical() -> f64 {
    0.1
}

fn default_cache_latency_warning_ms() -> f64 {
    1_000.0
}

fn default_asset_path() -> String {
    "/static/health-check.png".to_string()
}

fn default_asset_latency() -> LatencyThresholds {
    LatencyThresholds::new(1_500.0, 4_000.0)
}

fn default_query_set() -> Vec<String> {
    vec![
        "count(*)".to_string(),
        "*[defined(_type)] | order(_updatedAt desc) [0...10]{_id, _type}".to_string(),
        "array::unique(*[]._type)".to_string(),
    ]
}

fn default_error_rate_critical() -> f64 {
    0.5
}

fn default_query_latency() -> LatencyThresholds {
    LatencyThresholds::new(1_000.0, 3_000.0)
}
