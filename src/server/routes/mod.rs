//! HTTP route modules

pub mod health;

use crate::utils::error::ResponseCode;
use serde::Serialize;

/// Standard API response structure
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Whether the request was served
    pub success: bool,
    /// Abstract response code; `TIMEOUT` still carries best-effort data
    pub code: ResponseCode,
    /// Response data (if successful)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self::with_code(ResponseCode::Ok, data)
    }

    /// Create a response carrying data under `code`
    pub fn with_code(code: ResponseCode, data: T) -> Self {
        Self {
            success: true,
            code,
            data: Some(data),
            error: None,
        }
    }
}
