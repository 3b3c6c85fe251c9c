//! Probe threshold tests against the in-memory backend

use platform_health::backend::BackendError;
use platform_health::{HealthQuery, HealthSnapshot, SnapshotMode, Status};
use std::sync::Arc;
use std::time::Duration;

use crate::common::{ConfigFactory, FakeBackend, Reply, SnapshotAssertions, system_with};

async fn full_snapshot(backend: Arc<FakeBackend>) -> Arc<HealthSnapshot> {
    full_snapshot_with(ConfigFactory::engine(), backend).await
}

async fn full_snapshot_with(
    config: platform_health::config::EngineConfig,
    backend: Arc<FakeBackend>,
) -> Arc<HealthSnapshot> {
    let system = system_with(&config, backend);
    system
        .aggregator()
        .get_snapshot(SnapshotMode::Full, true)
        .await
}

#[tokio::test]
async fn test_healthy_backend_scores_100() {
    let snapshot = full_snapshot(Arc::new(FakeBackend::healthy())).await;

    snapshot.assert_consistent();
    assert_eq!(snapshot.components.len(), 5);
    for name in ["assets", "cache", "connection", "queries", "schemas"] {
        snapshot.assert_component(name, Status::Healthy);
    }
    assert_eq!(snapshot.score, 100);
    assert_eq!(snapshot.summary.message, "All systems operational");
    assert!(!snapshot.timed_out);
}

#[tokio::test]
async fn test_components_declare_dependencies() {
    let snapshot = full_snapshot(Arc::new(FakeBackend::healthy())).await;

    assert!(snapshot.components["connection"].dependencies.is_empty());
    assert_eq!(snapshot.components["cache"].dependencies, vec!["connection"]);
    assert_eq!(
        snapshot.components["queries"].dependencies,
        vec!["connection", "cache"]
    );
    assert_eq!(
        snapshot.components["schemas"].dependencies,
        vec!["connection", "queries"]
    );
}

#[tokio::test]
async fn test_quick_mode_probes_connection_and_cache() {
    let system = system_with(&ConfigFactory::engine(), Arc::new(FakeBackend::healthy()));
    let snapshot = system
        .aggregator()
        .get_snapshot(SnapshotMode::Quick, false)
        .await;

    let names: Vec<&str> = snapshot.components.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["cache", "connection"]);
    assert_eq!(snapshot.mode, SnapshotMode::Quick);
}

#[tokio::test]
async fn test_cache_miss_rate_thresholds() {
    let backend = Arc::new(FakeBackend::healthy());
    backend.set_cache_pattern(vec![Some(false)]);
    let snapshot = full_snapshot(backend).await;
    snapshot.assert_component("cache", Status::Critical);
    assert_eq!(
        snapshot.components["cache"].performance.cache_hit_rate,
        Some(0.0)
    );

    // one hit in three samples: 33%, below the 50% warning line
    let backend = Arc::new(FakeBackend::healthy());
    backend.set_cache_pattern(vec![Some(true), Some(false), Some(false)]);
    let snapshot = full_snapshot(backend).await;
    snapshot.assert_component("cache", Status::Warning);
}

#[tokio::test]
async fn test_cache_without_header_is_unresolved_warning() {
    let backend = Arc::new(FakeBackend::healthy());
    backend.set_cache_pattern(Vec::new());
    let snapshot = full_snapshot(backend).await;

    snapshot.assert_component("cache", Status::Warning);
    let cache = &snapshot.components["cache"];
    assert_eq!(cache.performance.cache_hit_rate, None);
    assert!(cache.issues[0].message.contains("could not be determined"));
}

#[tokio::test]
async fn test_asset_failures() {
    let backend = Arc::new(FakeBackend::healthy());
    backend.set_asset_status(404);
    let snapshot = full_snapshot(backend).await;
    snapshot.assert_component("assets", Status::Critical);
    assert_eq!(snapshot.components["assets"].performance.error_rate, 1.0);

    let backend = Arc::new(FakeBackend::healthy());
    backend.set_asset_length(0);
    let snapshot = full_snapshot(backend).await;
    snapshot.assert_component("assets", Status::Warning);
}

#[tokio::test]
async fn test_query_error_rate_thresholds() {
    let backend = Arc::new(FakeBackend::healthy());
    backend.fail_query("array::unique(*[]._type)");
    let snapshot = full_snapshot(backend).await;

    // 1 of 3 fails: warning. The schema probe relies on the same query.
    snapshot.assert_component("queries", Status::Warning);
    let queries = &snapshot.components["queries"];
    assert!((queries.performance.error_rate - 1.0 / 3.0).abs() < 1e-9);
    snapshot.assert_component("schemas", Status::Critical);

    let backend = Arc::new(FakeBackend::healthy());
    backend.fail_query("count(*)");
    backend.fail_query("array::unique(*[]._type)");
    let snapshot = full_snapshot(backend).await;
    snapshot.assert_component("queries", Status::Critical);
}

#[tokio::test]
async fn test_schema_expectations() {
    let backend = Arc::new(FakeBackend::healthy());
    let config = ConfigFactory::expecting_types(&["course", "lesson", "quiz", "track"]);
    let snapshot = full_snapshot_with(config, backend).await;

    snapshot.assert_component("schemas", Status::Warning);
    let schemas = &snapshot.components["schemas"];
    assert_eq!(schemas.issues.len(), 1);
    assert!(schemas.issues[0].message.ends_with("quiz, track"));

    let backend = Arc::new(FakeBackend::healthy());
    backend.set_document_count(0);
    let snapshot = full_snapshot(backend).await;
    snapshot.assert_component("schemas", Status::Critical);
}

#[tokio::test]
async fn test_slow_backend_raises_latency_issues() {
    let backend = Arc::new(FakeBackend::healthy());
    backend.set_latency(Duration::from_millis(60));

    let mut config = ConfigFactory::engine();
    config.probes.connection.latency.warning_ms = 20.0;
    config.probes.connection.latency.critical_ms = 10_000.0;
    let snapshot = full_snapshot_with(config, backend).await;

    snapshot.assert_component("connection", Status::Warning);
    assert!(
        snapshot.components["connection"].performance.average_response_time_ms >= 60.0
    );
}

#[tokio::test]
async fn test_unreachable_backend_is_reported_not_raised() {
    let system = system_with(&ConfigFactory::engine(), Arc::new(FakeBackend::down()));
    let outcome = system
        .health(HealthQuery::new(SnapshotMode::Full).forced())
        .await
        .expect("component failure is data, not an engine error");

    let platform_health::HealthPayload::Snapshot(snapshot) = outcome.data else {
        panic!("expected a structured snapshot");
    };
    snapshot.assert_consistent();
    for component in snapshot.components.values() {
        assert_eq!(component.status, Status::Critical, "{}", component.component_name);
        assert_eq!(component.performance.error_rate, 1.0);
    }
    assert_eq!(snapshot.score, 20);
    assert!(snapshot.summary.message.starts_with("Critical failure in:"));
}

#[tokio::test]
async fn test_hanging_dependency_is_isolated() {
    let backend = Arc::new(FakeBackend::healthy());
    backend.set_ping(Reply::Hang);
    let snapshot = full_snapshot(backend).await;

    snapshot.assert_consistent();
    snapshot.assert_component("connection", Status::Critical);
    assert!(
        snapshot.components["connection"].issues[0]
            .message
            .contains("timed out")
    );
    for name in ["assets", "cache", "queries", "schemas"] {
        snapshot.assert_component(name, Status::Healthy);
    }
    assert_eq!(snapshot.score, 84);
}

#[tokio::test]
async fn test_backend_error_suggestions_reach_issues() {
    let backend = Arc::new(FakeBackend::healthy());
    backend.set_ping(Reply::Fail(BackendError::Status {
        status: 401,
        message: "unauthorized".to_string(),
    }));
    let snapshot = full_snapshot(backend).await;

    let issue = &snapshot.components["connection"].issues[0];
    assert!(issue.message.contains("HTTP 401"));
    assert!(issue.suggestions.iter().any(|s| s.contains("token")));
}
