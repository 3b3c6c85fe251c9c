//! Snapshot export for download
//!
//! JSON is the snapshot structure as served by the API. CSV flattens the
//! components to one row each.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::monitoring::health::{ComponentHealth, HealthSnapshot};
use crate::utils::error::{EngineError, Result};

const CSV_HEADER: [&str; 7] = [
    "componentName",
    "status",
    "averageResponseTimeMs",
    "errorRate",
    "cacheHitRate",
    "issueCount",
    "lastChecked",
];

/// Download format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(EngineError::validation(format!(
                "unknown export format '{}', expected json or csv",
                other
            ))),
        }
    }
}

/// A serialized snapshot ready to hand out as a file
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedReport {
    pub content_type: &'static str,
    pub file_name: String,
    pub body: Bytes,
}

pub struct ExportFormatter;

impl ExportFormatter {
    /// Serialize `snapshot` in `format`
    pub fn format(snapshot: &HealthSnapshot, format: ExportFormat) -> Result<Bytes> {
        match format {
            ExportFormat::Json => Ok(Bytes::from(serde_json::to_vec_pretty(snapshot)?)),
            ExportFormat::Csv => Ok(Bytes::from(Self::csv(snapshot))),
        }
    }

    /// Serialize and name the download
    pub fn export(snapshot: &HealthSnapshot, format: ExportFormat) -> Result<ExportedReport> {
        Ok(ExportedReport {
            content_type: format.content_type(),
            file_name: Self::file_name(snapshot, format),
            body: Self::format(snapshot, format)?,
        })
    }

    /// `health-<mode>-<timestamp>.<ext>`
    pub fn file_name(snapshot: &HealthSnapshot, format: ExportFormat) -> String {
        format!(
            "health-{}-{}.{}",
            snapshot.mode,
            snapshot.timestamp.format("%Y%m%dT%H%M%SZ"),
            format.extension()
        )
    }

    fn csv(snapshot: &HealthSnapshot) -> String {
        let mut out = String::new();
        out.push_str(&CSV_HEADER.join(","));
        out.push_str("\r\n");

        for component in snapshot.components.values() {
            let row = csv_row(component);
            out.push_str(
                &row.iter()
                    .map(|cell| escape_cell(cell))
                    .collect::<Vec<_>>()
                    .join(","),
            );
            out.push_str("\r\n");
        }

        out
    }
}

fn csv_row(component: &ComponentHealth) -> [String; 7] {
    let perf = &component.performance;
    let cache_hit_rate = perf
        .cache_hit_rate
        .map(|rate| format!("{:.4}", rate))
        .unwrap_or_default();

    [
        component.component_name.clone(),
        component.status.to_string(),
        format!("{:.2}", perf.average_response_time_ms),
        format!("{:.4}", perf.error_rate),
        cache_hit_rate,
        component.issues.len().to_string(),
        component.last_checked.to_rfc3339(),
    ]
}

/// Quote a cell when it holds a delimiter, quote or line break
fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
