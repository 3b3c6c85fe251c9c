//! Component health: probes, aggregation and the snapshot cache
//!
//! A snapshot is never patched. Every pass recreates its component records and
//! replaces the cached snapshot for its mode wholesale.

mod aggregator;
mod cache;
pub mod probes;
mod scoring;
pub mod types;


pub use aggregator::HealthAggregator;
pub use cache::SnapshotCache;
pub use probes::{Probe, ProbeKind, ProbeRegistry, ProbeReport, run_probe};
pub use scoring::{compute_score, overall_status, summarize};
pub use types::{
    ComponentHealth, HealthSnapshot, HealthSummary, Issue, Performance, SnapshotMode, Status,
};
