//! Health snapshot types and data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::utils::error::EngineError;

/// Component health status levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Component is fully operational
    Healthy,
    /// Component works but is degraded
    Warning,
    /// Component is failing
    Critical,
}

impl Status {
    /// Contribution of one component to the snapshot score
    pub fn score(self) -> u32 {
        match self {
            Status::Healthy => 100,
            Status::Warning => 60,
            Status::Critical => 20,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Healthy => "healthy",
            Status::Warning => "warning",
            Status::Critical => "critical",
        }
    }

    /// Worst status across a set of issues; no issues means healthy
    pub fn from_issues(issues: &[Issue]) -> Self {
        issues
            .iter()
            .map(|issue| issue.status)
            .max()
            .unwrap_or(Status::Healthy)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot coverage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotMode {
    /// Reduced probe subset for frequent polling
    Quick,
    /// Every registered probe
    Full,
}

impl SnapshotMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SnapshotMode::Quick => "quick",
            SnapshotMode::Full => "full",
        }
    }
}

impl std::fmt::Display for SnapshotMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnapshotMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quick" => Ok(SnapshotMode::Quick),
            "full" => Ok(SnapshotMode::Full),
            other => Err(EngineError::validation(format!(
                "unknown snapshot mode '{}', expected quick or full",
                other
            ))),
        }
    }
}

/// One problem detected within a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Warning or critical; healthy components carry no issues
    pub status: Status,
    pub message: String,
    pub suggestions: Vec<String>,
}

impl Issue {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            status: Status::Warning,
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self {
            status: Status::Critical,
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions.extend(suggestions);
        self
    }
}

/// Performance measured by a probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    /// Average response time, never negative
    pub average_response_time_ms: f64,
    /// Share of failed calls in [0, 1]
    pub error_rate: f64,
    /// Share of cache hits in [0, 1], when measurable
    #[serde(default)]
    pub cache_hit_rate: Option<f64>,
}

impl Performance {
    pub fn new(average_response_time_ms: f64, error_rate: f64) -> Self {
        Self {
            average_response_time_ms: average_response_time_ms.max(0.0),
            error_rate: error_rate.clamp(0.0, 1.0),
            cache_hit_rate: None,
        }
    }

    pub fn with_cache_hit_rate(mut self, rate: Option<f64>) -> Self {
        self.cache_hit_rate = rate.map(|r| r.clamp(0.0, 1.0));
        self
    }

    /// Performance block of a probe that could not measure anything
    pub fn failed() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// One component's current state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHealth {
    pub component_name: String,
    pub status: Status,
    pub dependencies: Vec<String>,
    pub performance: Performance,
    pub issues: Vec<Issue>,
    pub last_checked: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl ComponentHealth {
    /// Build a component record; status always follows the issues
    pub fn new(
        component_name: impl Into<String>,
        dependencies: Vec<String>,
        performance: Performance,
        issues: Vec<Issue>,
        endpoint: Option<String>,
    ) -> Self {
        Self {
            component_name: component_name.into(),
            status: Status::from_issues(&issues),
            dependencies,
            performance,
            issues,
            last_checked: Utc::now(),
            endpoint,
        }
    }

    pub fn critical_issues(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.status == Status::Critical)
            .count()
    }

    pub fn warning_issues(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.status == Status::Warning)
            .count()
    }
}

/// Snapshot summary block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSummary {
    pub status: Status,
    pub message: String,
    pub issue_count: usize,
    pub critical_issues: usize,
    pub warning_issues: usize,
}

/// One complete, immutable aggregation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub timestamp: DateTime<Utc>,
    pub mode: SnapshotMode,
    /// Components keyed by name
    pub components: BTreeMap<String, ComponentHealth>,
    pub summary: HealthSummary,
    pub score: u8,
    /// The aggregation deadline cut off at least one probe
    #[serde(default)]
    pub timed_out: bool,
}
