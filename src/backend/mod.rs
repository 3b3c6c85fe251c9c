//! Access to the monitored content platform
//!
//! Probes and diagnostic tests only ever see [`ContentBackend`], so the
//! transport can be swapped (or faked in tests) without touching them.

mod error;
pub mod http;

pub use error::BackendError;
pub use http::HttpBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type for backend calls
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Answer from the query layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Query result as returned by the backend
    pub result: serde_json::Value,
    /// Server-side execution time, when reported
    pub server_ms: Option<u64>,
    /// Whether the answer came from a cache, when the layer says so
    pub cache_hit: Option<bool>,
}

/// Answer from the asset CDN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetResponse {
    /// HTTP status code
    pub status: u16,
    /// `Content-Type` header
    pub content_type: Option<String>,
    /// Body size in bytes
    pub content_length: u64,
    /// Whether the CDN served the asset from its cache
    pub cache_hit: Option<bool>,
}

impl AssetResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Read-only operations the engine performs against the platform
#[async_trait]
pub trait ContentBackend: Send + Sync + std::fmt::Debug {
    /// Round trip to the content API
    async fn ping(&self) -> BackendResult<()>;

    /// Run a query against the origin query layer
    async fn query(&self, query: &str) -> BackendResult<QueryResponse>;

    /// Run a query through the caching layer
    async fn cached_query(&self, query: &str) -> BackendResult<QueryResponse>;

    /// Fetch an asset from the CDN
    async fn fetch_asset(&self, path: &str) -> BackendResult<AssetResponse>;

    /// Distinct document types present in the dataset
    async fn document_types(&self) -> BackendResult<Vec<String>> {
        let response = self.query("array::unique(*[]._type)").await?;
        parse_document_types(&response.result)
    }

    /// Total number of documents in the dataset
    async fn document_count(&self) -> BackendResult<u64> {
        let response = self.query("count(*)").await?;
        response.result.as_u64().ok_or_else(|| {
            BackendError::Malformed(format!(
                "expected a non-negative integer document count, got {}",
                response.result
            ))
        })
    }
}

/// Interpret a query result as a list of document type names
pub fn parse_document_types(value: &serde_json::Value) -> BackendResult<Vec<String>> {
    let items = value.as_array().ok_or_else(|| {
        BackendError::Malformed(format!("expected an array of type names, got {}", value))
    })?;

    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                BackendError::Malformed(format!("expected a type name string, got {}", item))
            })
        })
        .collect()
}
