//! Error types for the health engine

use crate::backend::BackendError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for the health engine
pub type Result<T> = std::result::Result<T, EngineError>;

/// Main error type for the health engine
///
/// Component degradation is never reported through this type; an unhealthy
/// backend is data inside a snapshot. Only malformed requests and faults in the
/// engine itself cross the engine boundary as errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Backend access errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Snapshot cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal engine errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Abstract response code this error surfaces as
    pub fn code(&self) -> ResponseCode {
        match self {
            EngineError::Validation(_) => ResponseCode::ValidationError,
            EngineError::Timeout(_) => ResponseCode::Timeout,
            _ => ResponseCode::InternalError,
        }
    }
}

/// Transport-independent outcome codes for the two engine contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseCode {
    /// Snapshot or test result returned
    Ok,
    /// Malformed request, rejected before dispatch
    ValidationError,
    /// A bound was exceeded; a best-effort result is still returned
    Timeout,
    /// Unexpected fault in the engine itself
    InternalError,
}

impl ResponseCode {
    /// Wire name of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseCode::Ok => "OK",
            ResponseCode::ValidationError => "VALIDATION_ERROR",
            ResponseCode::Timeout => "TIMEOUT",
            ResponseCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
