//! HTTP routes through the actix test harness

use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_DISPOSITION;
use actix_web::{test, web};
use platform_health::Config;
use platform_health::server::{AppState, HttpServer};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::common::{ConfigFactory, FakeBackend, system_with};

fn state() -> web::Data<AppState> {
    let system = system_with(&ConfigFactory::engine(), Arc::new(FakeBackend::healthy()));
    web::Data::new(AppState::new(Config::default(), system))
}

#[actix_web::test]
async fn test_health_snapshot_envelope() {
    let app = test::init_service(HttpServer::create_app(state())).await;

    let req = test::TestRequest::get().uri("/health?mode=full").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("server").unwrap(), "platform-health");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["code"], "OK");
    assert_eq!(body["data"]["mode"], "full");
    assert_eq!(body["data"]["summary"]["status"], "healthy");
    assert_eq!(body["data"]["score"], 100);
    assert_eq!(body["data"]["components"].as_object().unwrap().len(), 5);
}

#[actix_web::test]
async fn test_health_defaults_to_quick() {
    let app = test::init_service(HttpServer::create_app(state())).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["mode"], "quick");
}

#[actix_web::test]
async fn test_health_csv_download() {
    let app = test::init_service(HttpServer::create_app(state())).await;

    let req = test::TestRequest::get()
        .uri("/health?mode=full&format=csv")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("x-health-code").unwrap(), "OK");

    let disposition = resp
        .headers()
        .get(CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("health-full-"));

    let body = test::read_body(resp).await;
    let text = std::str::from_utf8(&body).unwrap();
    assert!(text.starts_with("componentName,status,"));
    assert_eq!(text.lines().count(), 6);
}

#[actix_web::test]
async fn test_invalid_mode_is_a_validation_error() {
    let app = test::init_service(HttpServer::create_app(state())).await;

    let req = test::TestRequest::get().uri("/health?mode=fast").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_component_test_route() {
    let app = test::init_service(HttpServer::create_app(state())).await;

    let req = test::TestRequest::post()
        .uri("/health/test")
        .set_json(json!({ "componentName": "connection", "testType": "connectivity" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "OK");
    assert_eq!(body["data"]["componentName"], "connection");
    assert_eq!(body["data"]["testType"], "connectivity");
    assert_eq!(body["data"]["success"], true);
    assert!(body["data"]["testId"].is_string());
}

#[actix_web::test]
async fn test_custom_test_without_query_is_rejected() {
    let app = test::init_service(HttpServer::create_app(state())).await;

    let req = test::TestRequest::post()
        .uri("/health/test")
        .set_json(json!({ "componentName": "queries", "testType": "custom" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("customQuery"));
}

#[actix_web::test]
async fn test_malformed_test_body_is_rejected() {
    let app = test::init_service(HttpServer::create_app(state())).await;

    let req = test::TestRequest::post()
        .uri("/health/test")
        .set_json(json!({ "componentName": "queries", "testType": "load" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_cache_invalidation_route() {
    let state = state();
    let app = test::init_service(HttpServer::create_app(state.clone())).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    test::call_service(&app, req).await;
    assert_eq!(state.system.aggregator().passes(), 1);

    let req = test::TestRequest::post()
        .uri("/health/cache/invalidate")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["invalidated"], true);

    let req = test::TestRequest::get().uri("/health").to_request();
    test::call_service(&app, req).await;
    assert_eq!(state.system.aggregator().passes(), 2);
}

#[actix_web::test]
async fn test_version_route() {
    let app = test::init_service(HttpServer::create_app(state())).await;

    let req = test::TestRequest::get().uri("/version").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
}
