//! Top-level engine configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Main engine configuration, one section per concern
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub probes: ProbesConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub cache: SnapshotCacheConfig,
    #[serde(default)]
    pub testing: TestingConfig,
}
