//! Diagnostic test request and result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::monitoring::health::ProbeKind;
use crate::utils::error::EngineError;

/// Kind of on-demand test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    /// The component answers within a bound
    Connectivity,
    /// Average latency over repeated calls stays under a threshold
    Performance,
    /// A fixed validation query returns the expected shape
    DataIntegrity,
    /// A caller-supplied query executes without error
    Custom,
}

impl TestType {
    pub const ALL: [TestType; 4] = [
        TestType::Connectivity,
        TestType::Performance,
        TestType::DataIntegrity,
        TestType::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TestType::Connectivity => "connectivity",
            TestType::Performance => "performance",
            TestType::DataIntegrity => "data_integrity",
            TestType::Custom => "custom",
        }
    }
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                EngineError::validation(format!(
                    "unknown test type '{}', expected one of connectivity, performance, data_integrity, custom",
                    s
                ))
            })
    }
}

/// A request to run one test against one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRequest {
    pub component_name: String,
    pub test_type: TestType,
    /// Required for custom tests, rejected otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_query: Option<String>,
}

impl TestRequest {
    pub fn new(component_name: impl Into<String>, test_type: TestType) -> Self {
        Self {
            component_name: component_name.into(),
            test_type,
            custom_query: None,
        }
    }

    pub fn custom(component_name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            component_name: component_name.into(),
            test_type: TestType::Custom,
            custom_query: Some(query.into()),
        }
    }
}

/// A validated request, ready to dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPlan {
    pub kind: ProbeKind,
    pub test_type: TestType,
    pub query: Option<String>,
}

/// Timed outcome of one test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub test_id: Uuid,
    pub component_name: String,
    pub test_type: TestType,
    pub success: bool,
    pub message: String,
    pub duration_ms: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    /// The test was cut off by its time bound
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
