//! Health snapshot, component test and version endpoints

use crate::monitoring::diagnostics::TestRequest;
use crate::monitoring::{HealthPayload, HealthQuery};
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::Serialize;
use std::borrow::Cow;
use tracing::debug;

/// Header carrying the response code on raw exports
pub const RESPONSE_CODE_HEADER: &str = "x-health-code";

/// Configure health routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/health")
            .route("", web::get().to(health_snapshot))
            .route("/test", web::post().to(run_test))
            .route("/cache/invalidate", web::post().to(invalidate_cache)),
    )
    .route("/version", web::get().to(version_info));
}

/// `GET /health?mode=quick|full&force=bool&format=json|csv`
///
/// Without `format` the snapshot comes back in the API envelope; with it the
/// export is returned as a file download.
pub async fn health_snapshot(
    state: web::Data<AppState>,
    query: web::Query<HealthQuery>,
) -> ActixResult<HttpResponse> {
    let query = query.into_inner();
    debug!(mode = %query.mode, force = query.force, "health snapshot requested");

    let outcome = state.system.health(query).await?;
    let response = match outcome.data {
        HealthPayload::Snapshot(snapshot) => HttpResponse::Ok().json(ApiResponse::with_code(
            outcome.code,
            snapshot.as_ref(),
        )),
        HealthPayload::Export(report) => HttpResponse::Ok()
            .content_type(report.content_type)
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(report.file_name)],
            })
            .insert_header((RESPONSE_CODE_HEADER, outcome.code.as_str()))
            .body(report.body),
    };

    Ok(response)
}

/// `POST /health/test`
pub async fn run_test(
    state: web::Data<AppState>,
    request: web::Json<TestRequest>,
) -> ActixResult<HttpResponse> {
    let request = request.into_inner();
    debug!(
        component = %request.component_name,
        test_type = %request.test_type,
        "component test requested"
    );

    let outcome = state.system.test(request).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_code(outcome.code, outcome.data)))
}

/// `POST /health/cache/invalidate`
pub async fn invalidate_cache(state: web::Data<AppState>) -> HttpResponse {
    state.system.invalidate_cache();
    HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "invalidated": true })))
}

/// `GET /version`
pub async fn version_info() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(VersionInfo::current()))
}

/// Build metadata
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: Cow<'static, str>,
    pub build_time: Cow<'static, str>,
    pub git_hash: Cow<'static, str>,
    pub rust_version: Cow<'static, str>,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            version: Cow::Borrowed(crate::VERSION),
            build_time: Cow::Borrowed(env!("BUILD_TIME")),
            git_hash: Cow::Borrowed(env!("GIT_HASH")),
            rust_version: Cow::Borrowed(env!("RUST_VERSION")),
        }
    }
}
