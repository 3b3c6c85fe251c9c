//! HTTP response handling for errors

use super::types::{EngineError, ResponseCode};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use tracing::error;

/// Error body returned to HTTP callers
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    /// Always false for error bodies
    pub success: bool,
    /// Abstract response code
    pub code: ResponseCode,
    /// Human-readable message
    pub error: String,
}

impl ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        match self.code() {
            ResponseCode::ValidationError => StatusCode::BAD_REQUEST,
            ResponseCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ResponseCode::Ok | ResponseCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self.code() {
            // Internal details stay in the logs
            ResponseCode::InternalError => {
                error!(error = %self, "internal engine error");
                "Internal engine error".to_string()
            }
            _ => self.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            success: false,
            code: self.code(),
            error: message,
        })
    }
}
