//! Diagnostic test runner configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for on-demand component tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestingConfig {
    /// Upper bound for a whole test, in milliseconds
    #[serde(default = "default_test_timeout_ms")]
    pub test_timeout_ms: u64,
    /// A connectivity test fails when the response takes longer than this
    #[serde(default = "default_connectivity_timeout_ms")]
    pub connectivity_timeout_ms: u64,
    /// Calls issued by a performance test
    #[serde(default = "default_performance_iterations")]
    pub performance_iterations: u32,
    /// A performance test passes when the average is under this
    #[serde(default = "default_performance_threshold_ms")]
    pub performance_threshold_ms: u64,
    #[serde(default)]
    pub custom_query: CustomQueryConfig,
}

impl Default for TestingConfig {
    fn default() -> Self {
        Self {
            test_timeout_ms: default_test_timeout_ms(),
            connectivity_timeout_ms: default_connectivity_timeout_ms(),
            performance_iterations: default_performance_iterations(),
            performance_threshold_ms: default_performance_threshold_ms(),
            custom_query: CustomQueryConfig::default(),
        }
    }
}

impl TestingConfig {
    pub fn test_timeout(&self) -> Duration {
        Duration::from_millis(self.test_timeout_ms)
    }

    pub fn connectivity_timeout(&self) -> Duration {
        Duration::from_millis(self.connectivity_timeout_ms)
    }
}

/// Guard applied to caller-supplied queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomQueryConfig {
    /// Reject queries that look like mutations
    #[serde(default = "default_true")]
    pub read_only: bool,
    /// Maximum query length in characters
    #[serde(default = "default_max_query_length")]
    pub max_length: usize,
}

impl Default for CustomQueryConfig {
    fn default() -> Self {
        Self {
            read_only: true,
            max_length: default_max_query_length(),
        }
    }
}

fn default_test_timeout_ms() -> u64 {
    15_000
}

fn default_connectivity_timeout_ms() -> u64 {
    3_000
}

fn default_performance_iterations() -> u32 {
    5
}

fn default_performance_threshold_ms() -> u64 {
    1_000
}

fn default_max_query_length() -> usize {
    10_000
}
