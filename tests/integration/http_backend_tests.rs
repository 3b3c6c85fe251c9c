//! HttpBackend against a mock content platform

use platform_health::backend::{BackendError, ContentBackend, HttpBackend};
use platform_health::config::BackendConfig;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUERY_PATH: &str = "/v2021-10-21/data/query/production";

fn backend_for(server: &MockServer) -> HttpBackend {
    HttpBackend::new(&BackendConfig {
        api_url: server.uri(),
        cdn_url: server.uri(),
        asset_url: server.uri(),
        request_timeout_ms: 500,
        ..BackendConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_ping() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2021-10-21/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("PONG"))
        .expect(1)
        .mount(&server)
        .await;

    backend_for(&server).ping().await.unwrap();
}

#[tokio::test]
async fn test_ping_server_error() {
    let server = MockServer::start().await;
    Mock::given(path("/v2021-10-21/ping"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = backend_for(&server).ping().await.unwrap_err();
    assert_eq!(
        err,
        BackendError::Status {
            status: 503,
            message: "maintenance".to_string()
        }
    );
}

#[tokio::test]
async fn test_query_parses_result_and_timing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .and(query_param("query", "count(*)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ms": 7,
            "query": "count(*)",
            "result": 1280
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let response = backend.query("count(*)").await.unwrap();
    assert_eq!(response.result, json!(1280));
    assert_eq!(response.server_ms, Some(7));
    assert_eq!(response.cache_hit, None);

    assert_eq!(backend.document_count().await.unwrap(), 1280);
}

#[tokio::test]
async fn test_cached_query_reads_cache_header() {
    let server = MockServer::start().await;
    Mock::given(path(QUERY_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-cache", "HIT")
                .set_body_json(json!({ "ms": 1, "result": ["course", "lesson"] })),
        )
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let response = backend.cached_query("array::unique(*[]._type)").await.unwrap();
    assert_eq!(response.cache_hit, Some(true));

    let types = backend.document_types().await.unwrap();
    assert_eq!(types, vec!["course".to_string(), "lesson".to_string()]);
}

#[tokio::test]
async fn test_query_error_body() {
    let server = MockServer::start().await;
    Mock::given(path(QUERY_PATH))
        .and(query_param("query", "*[_type =="))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "description": "unexpected end of query", "type": "queryParseError" }
        })))
        .mount(&server)
        .await;
    Mock::given(path(QUERY_PATH))
        .and(query_param("query", "count(*)"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    assert_eq!(
        backend.query("*[_type ==").await.unwrap_err(),
        BackendError::Query("unexpected end of query".to_string())
    );
    assert!(matches!(
        backend.query("count(*)").await.unwrap_err(),
        BackendError::Status { status: 500, .. }
    ));
}

#[tokio::test]
async fn test_malformed_query_response() {
    let server = MockServer::start().await;
    Mock::given(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ms": 2 })))
        .mount(&server)
        .await;

    let err = backend_for(&server).query("count(*)").await.unwrap_err();
    assert!(matches!(err, BackendError::Malformed(_)));
}

#[tokio::test]
async fn test_fetch_asset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/health-check.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-cache", "MISS")
                .set_body_raw(vec![0u8; 68], "image/png"),
        )
        .mount(&server)
        .await;

    let asset = backend_for(&server)
        .fetch_asset("/images/health-check.png")
        .await
        .unwrap();
    assert!(asset.is_success());
    assert_eq!(asset.content_length, 68);
    assert_eq!(asset.content_type.as_deref(), Some("image/png"));
    assert_eq!(asset.cache_hit, Some(false));
}

#[tokio::test]
async fn test_missing_asset_is_a_response_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(path("/images/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let asset = backend_for(&server)
        .fetch_asset("/images/gone.png")
        .await
        .unwrap();
    assert_eq!(asset.status, 404);
    assert!(!asset.is_success());
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    Mock::given(path("/v2021-10-21/ping"))
        .and(header("authorization", "Bearer sk-read-only"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&BackendConfig {
        api_url: server.uri(),
        token: Some("sk-read-only".to_string()),
        ..BackendConfig::default()
    })
    .unwrap();
    backend.ping().await.unwrap();
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(path("/v2021-10-21/ping"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let err = backend_for(&server).ping().await.unwrap_err();
    assert_eq!(err, BackendError::Timeout(500));
}

#[tokio::test]
async fn test_unreachable_backend() {
    // bind then drop to get a port nothing listens on
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let backend = HttpBackend::new(&BackendConfig {
        api_url: format!("http://127.0.0.1:{}", port),
        ..BackendConfig::default()
    })
    .unwrap();

    let err = backend.ping().await.unwrap_err();
    assert!(matches!(err, BackendError::Unreachable(_)), "{:?}", err);
}
