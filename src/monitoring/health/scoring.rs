//! Snapshot score and summary derivation
//!
//! Score and summary are pure functions of the component set. They are
//! recomputed whenever a snapshot is built and never patched afterwards.

use chrono::Utc;
use std::collections::BTreeMap;

use super::types::{ComponentHealth, HealthSnapshot, HealthSummary, SnapshotMode, Status};

/// Mean component score, rounded; an empty set scores 100
pub fn compute_score<'a, I>(components: I) -> u8
where
    I: IntoIterator<Item = &'a ComponentHealth>,
{
    let (total, count) = components
        .into_iter()
        .fold((0u32, 0u32), |(total, count), c| {
            (total + c.status.score(), count + 1)
        });

    if count == 0 {
        return 100;
    }

    (f64::from(total) / f64::from(count)).round() as u8
}

/// Worst component status; an empty set is healthy
pub fn overall_status<'a, I>(components: I) -> Status
where
    I: IntoIterator<Item = &'a ComponentHealth>,
{
    components
        .into_iter()
        .map(|c| c.status)
        .max()
        .unwrap_or(Status::Healthy)
}

/// Build the summary block for a component set
pub fn summarize(components: &BTreeMap<String, ComponentHealth>) -> HealthSummary {
    let status = overall_status(components.values());
    let critical_issues: usize = components.values().map(|c| c.critical_issues()).sum();
    let warning_issues: usize = components.values().map(|c| c.warning_issues()).sum();

    let message = match status {
        Status::Healthy => "All systems operational".to_string(),
        Status::Warning => {
            let degraded = components
                .values()
                .filter(|c| c.status == Status::Warning)
                .count();
            if degraded == 1 {
                "1 component degraded".to_string()
            } else {
                format!("{} components degraded", degraded)
            }
        }
        Status::Critical => {
            let failing: Vec<&str> = components
                .values()
                .filter(|c| c.status == Status::Critical)
                .map(|c| c.component_name.as_str())
                .collect();
            format!("Critical failure in: {}", failing.join(", "))
        }
    };

    HealthSummary {
        status,
        message,
        issue_count: critical_issues + warning_issues,
        critical_issues,
        warning_issues,
    }
}

impl HealthSnapshot {
    /// Assemble a snapshot, deriving score and summary from `components`
    pub fn from_components(
        mode: SnapshotMode,
        components: BTreeMap<String, ComponentHealth>,
        timed_out: bool,
    ) -> Self {
        let summary = summarize(&components);
        let score = compute_score(components.values());

        Self {
            timestamp: Utc::now(),
            mode,
            components,
            summary,
            score,
            timed_out,
        }
    }

    /// Check the derived fields still agree with the components
    pub fn verify(&self) -> Result<(), String> {
        for (key, component) in &self.components {
            if key != &component.component_name {
                return Err(format!(
                    "component keyed as '{}' is named '{}'",
                    key, component.component_name
                ));
            }
            if component.status != Status::from_issues(&component.issues) {
                return Err(format!(
                    "component '{}' status disagrees with its issues",
                    key
                ));
            }
        }

        let expected_score = compute_score(self.components.values());
        if self.score != expected_score {
            return Err(format!(
                "score {} does not match components (expected {})",
                self.score, expected_score
            ));
        }

        if self.summary != summarize(&self.components) {
            return Err("summary does not match components".to_string());
        }

        Ok(())
    }
}
