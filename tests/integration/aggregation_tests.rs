//! Snapshot path through MonitoringSystem: caching, coalescing, export and
//! response codes

use platform_health::{
    ExportFormat, HealthPayload, HealthQuery, HealthSnapshot, ResponseCode, SnapshotMode, Status,
};
use std::sync::Arc;
use std::time::Duration;

use crate::common::{ConfigFactory, FakeBackend, Reply, SnapshotAssertions, system_with};

fn snapshot_of(payload: HealthPayload) -> Arc<HealthSnapshot> {
    match payload {
        HealthPayload::Snapshot(snapshot) => snapshot,
        HealthPayload::Export(report) => panic!("expected a snapshot, got {}", report.file_name),
    }
}

#[tokio::test]
async fn test_repeated_reads_are_served_from_cache() {
    let backend = Arc::new(FakeBackend::healthy());
    let system = system_with(&ConfigFactory::engine(), backend.clone());

    let first = snapshot_of(system.health(HealthQuery::new(SnapshotMode::Full)).await.unwrap().data);
    let calls = backend.calls();
    let second = snapshot_of(system.health(HealthQuery::new(SnapshotMode::Full)).await.unwrap().data);

    assert_eq!(backend.calls(), calls);
    assert_eq!(first.timestamp, second.timestamp);
    assert_eq!(
        serde_json::to_vec(first.as_ref()).unwrap(),
        serde_json::to_vec(second.as_ref()).unwrap()
    );
}

#[tokio::test]
async fn test_forced_read_refreshes_cache() {
    let backend = Arc::new(FakeBackend::healthy());
    let system = system_with(&ConfigFactory::engine(), backend.clone());

    let cached = snapshot_of(system.health(HealthQuery::new(SnapshotMode::Quick)).await.unwrap().data);
    cached.assert_component("connection", Status::Healthy);

    backend.set_ping(Reply::Fail(platform_health::backend::BackendError::Unreachable(
        "gone".to_string(),
    )));

    // unforced reads keep serving the cached pass
    let stale = snapshot_of(system.health(HealthQuery::new(SnapshotMode::Quick)).await.unwrap().data);
    stale.assert_component("connection", Status::Healthy);

    let forced = snapshot_of(
        system
            .health(HealthQuery::new(SnapshotMode::Quick).forced())
            .await
            .unwrap()
            .data,
    );
    forced.assert_component("connection", Status::Critical);

    let after = snapshot_of(system.health(HealthQuery::new(SnapshotMode::Quick)).await.unwrap().data);
    assert_eq!(after.timestamp, forced.timestamp);
    assert_eq!(system.aggregator().passes(), 2);
}

#[tokio::test]
async fn test_invalidate_cache_forces_next_pass() {
    let system = system_with(&ConfigFactory::engine(), Arc::new(FakeBackend::healthy()));

    system.health(HealthQuery::new(SnapshotMode::Quick)).await.unwrap();
    system.health(HealthQuery::new(SnapshotMode::Full)).await.unwrap();
    system.invalidate_cache();
    system.health(HealthQuery::new(SnapshotMode::Quick)).await.unwrap();

    assert_eq!(system.aggregator().passes(), 3);
}

#[tokio::test]
async fn test_overlapping_pollers_share_one_pass() {
    let backend = Arc::new(FakeBackend::healthy());
    backend.set_latency(Duration::from_millis(50));
    let system = system_with(&ConfigFactory::engine(), backend);

    let pollers = (0..8).map(|_| {
        let system = system.clone();
        tokio::spawn(async move { system.health(HealthQuery::new(SnapshotMode::Full)).await })
    });
    let results = futures::future::join_all(pollers).await;

    let snapshots: Vec<Arc<HealthSnapshot>> = results
        .into_iter()
        .map(|r| snapshot_of(r.unwrap().unwrap().data))
        .collect();
    assert!(snapshots.iter().all(|s| Arc::ptr_eq(s, &snapshots[0])));
    assert_eq!(system.aggregator().passes(), 1);
}

#[tokio::test]
async fn test_aggregation_deadline_reports_timeout_code() {
    let backend = Arc::new(FakeBackend::healthy());
    backend.set_ping(Reply::Hang);

    let mut config = ConfigFactory::engine();
    config.probes.probe_timeout_ms = 10_000;
    config.aggregation.quick_timeout_ms = 150;
    let system = system_with(&config, backend);

    let outcome = system
        .health(HealthQuery::new(SnapshotMode::Quick))
        .await
        .unwrap();

    assert_eq!(outcome.code, ResponseCode::Timeout);
    let snapshot = snapshot_of(outcome.data);
    assert!(snapshot.timed_out);
    snapshot.assert_consistent();
    snapshot.assert_component("connection", Status::Critical);
    snapshot.assert_component("cache", Status::Healthy);

    // a cached cut-off snapshot keeps reporting the code it was built with
    let cached = system
        .health(HealthQuery::new(SnapshotMode::Quick))
        .await
        .unwrap();
    assert_eq!(cached.code, ResponseCode::Timeout);
    assert_eq!(system.aggregator().passes(), 1);
}

#[tokio::test]
async fn test_csv_export_through_health_query() {
    let system = system_with(&ConfigFactory::engine(), Arc::new(FakeBackend::healthy()));

    let outcome = system
        .health(HealthQuery::new(SnapshotMode::Full).exported(ExportFormat::Csv))
        .await
        .unwrap();
    assert_eq!(outcome.code, ResponseCode::Ok);

    let HealthPayload::Export(report) = outcome.data else {
        panic!("expected an export");
    };
    assert!(report.content_type.starts_with("text/csv"));
    assert!(report.file_name.starts_with("health-full-"));
    assert!(report.file_name.ends_with(".csv"));

    let text = String::from_utf8(report.body.to_vec()).unwrap();
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows.len(), 6);
    assert!(rows[0].starts_with("componentName,status,"));
    assert!(rows[1].starts_with("assets,healthy,"));
}

#[tokio::test]
async fn test_json_export_matches_served_snapshot() {
    let system = system_with(&ConfigFactory::engine(), Arc::new(FakeBackend::healthy()));

    let served = snapshot_of(system.health(HealthQuery::new(SnapshotMode::Full)).await.unwrap().data);
    let outcome = system
        .health(HealthQuery::new(SnapshotMode::Full).exported(ExportFormat::Json))
        .await
        .unwrap();
    let HealthPayload::Export(report) = outcome.data else {
        panic!("expected an export");
    };

    let parsed: HealthSnapshot = serde_json::from_slice(&report.body).unwrap();
    assert_eq!(parsed.timestamp, served.timestamp);
    assert_eq!(parsed.score, served.score);
    assert_eq!(parsed.summary, served.summary);
    assert_eq!(parsed.mode, served.mode);
    for (name, component) in &served.components {
        let round_tripped = &parsed.components[name];
        assert_eq!(round_tripped.status, component.status);
        assert_eq!(round_tripped.issues, component.issues);
        assert_eq!(round_tripped.dependencies, component.dependencies);
        assert_eq!(round_tripped.last_checked, component.last_checked);
        assert!(
            (round_tripped.performance.average_response_time_ms
                - component.performance.average_response_time_ms)
                .abs()
                < 1e-6
        );
    }
}
