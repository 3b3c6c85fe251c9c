//! HTTP implementation of [`ContentBackend`]

use super::{AssetResponse, BackendError, BackendResult, ContentBackend, QueryResponse};
use crate::config::BackendConfig;
use crate::utils::error::{EngineError, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;
use url::Url;

const CACHE_HEADER: &str = "x-cache";
const ERROR_BODY_LIMIT: usize = 512;

/// Content backend reached over its HTTP API
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    /// Create a backend client from configuration
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("platform-health/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EngineError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn endpoint(&self, base: &str, path: &str) -> BackendResult<Url> {
        let raw = format!("{}{}", base.trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| BackendError::Malformed(format!("invalid URL {}: {}", raw, e)))
    }

    fn query_url(&self, base: &str, query: &str) -> BackendResult<Url> {
        let mut url = self.endpoint(
            base,
            &format!(
                "/{}/data/query/{}",
                self.config.api_version, self.config.dataset
            ),
        )?;
        url.query_pairs_mut().append_pair("query", query);
        Ok(url)
    }

    async fn get(&self, url: Url) -> BackendResult<Response> {
        debug!(url = %url.path(), "backend request");

        let mut request = self.client.get(url);
        if let Some(token) = &self.config.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        request.send().await.map_err(|e| self.classify(e))
    }

    fn classify(&self, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Timeout(self.config.request_timeout_ms)
        } else if err.is_decode() {
            BackendError::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            BackendError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            BackendError::Unreachable(err.to_string())
        }
    }

    async fn run_query(&self, base: &str, query: &str) -> BackendResult<QueryResponse> {
        let url = self.query_url(base, query)?;
        let response = self.get(url).await?;
        let cache_hit = cache_hit_from(response.headers());
        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(query_error(status.as_u16(), &body));
        }

        let payload: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| BackendError::Malformed(format!("query response is not JSON: {}", e)))?;
        let object = payload
            .as_object()
            .ok_or_else(|| BackendError::Malformed("query response is not an object".to_string()))?;
        let result = object
            .get("result")
            .cloned()
            .ok_or_else(|| BackendError::Malformed("query response has no result".to_string()))?;

        Ok(QueryResponse {
            result,
            server_ms: object.get("ms").and_then(serde_json::Value::as_u64),
            cache_hit,
        })
    }
}

#[async_trait]
impl ContentBackend for HttpBackend {
    async fn ping(&self) -> BackendResult<()> {
        let url = self.endpoint(
            &self.config.api_url,
            &format!("/{}/ping", self.config.api_version),
        )?;
        let response = self.get(url).await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(BackendError::Status {
                status: status.as_u16(),
                message: truncate(&body),
            })
        }
    }

    async fn query(&self, query: &str) -> BackendResult<QueryResponse> {
        self.run_query(&self.config.api_url, query).await
    }

    async fn cached_query(&self, query: &str) -> BackendResult<QueryResponse> {
        self.run_query(&self.config.cdn_url, query).await
    }

    async fn fetch_asset(&self, path: &str) -> BackendResult<AssetResponse> {
        let url = self.endpoint(&self.config.asset_url, path)?;
        let response = self.get(url).await?;

        let status = response.status().as_u16();
        let cache_hit = cache_hit_from(response.headers());
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        Ok(AssetResponse {
            status,
            content_type,
            content_length: body.len() as u64,
            cache_hit,
        })
    }
}

/// `HIT…` / `MISS…` in the cache header; anything else is undetermined
fn cache_hit_from(headers: &HeaderMap) -> Option<bool> {
    let value = headers.get(CACHE_HEADER)?.to_str().ok()?.to_ascii_uppercase();
    if value.starts_with("HIT") {
        Some(true)
    } else if value.starts_with("MISS") {
        Some(false)
    } else {
        None
    }
}

fn query_error(status: u16, body: &str) -> BackendError {
    let description = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/description")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        });

    match description {
        Some(description) if status < 500 => BackendError::Query(description),
        Some(description) => BackendError::Status {
            status,
            message: description,
        },
        None => BackendError::Status {
            status,
            message: truncate(body),
        },
    }
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}
