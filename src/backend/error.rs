//! Backend access errors

use thiserror::Error;

/// Failure talking to the monitored content platform
///
/// These describe the backend, not the engine: probes turn them into
/// component issues and tests turn them into failed results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The backend could not be reached at all
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// The backend answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The query layer rejected or failed a query
    #[error("query failed: {0}")]
    Query(String),

    /// The backend answered with something we cannot interpret
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The backend did not answer in time
    #[error("request timed out after {0}ms")]
    Timeout(u64),
}

impl BackendError {
    /// Remediation hints shown alongside issues raised from this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            BackendError::Unreachable(_) => vec![
                "Check network connectivity to the content API".to_string(),
                "Verify backend.api_url and DNS resolution".to_string(),
            ],
            BackendError::Status { status, .. } if *status == 401 || *status == 403 => vec![
                "Verify the read token has access to the dataset".to_string(),
            ],
            BackendError::Status { status, .. } if *status >= 500 => vec![
                "The platform is returning server errors; check its status page".to_string(),
            ],
            BackendError::Status { .. } => vec![
                "Verify backend.dataset and backend.api_version".to_string(),
            ],
            BackendError::Query(_) => vec![
                "Run the failing query manually to inspect the error".to_string(),
            ],
            BackendError::Malformed(_) => vec![
                "Check that the configured API version matches the backend".to_string(),
            ],
            BackendError::Timeout(_) => vec![
                "Inspect backend latency and recent deploys".to_string(),
                "Raise backend.request_timeout_ms if the slowness is expected".to_string(),
            ],
        }
    }
}
