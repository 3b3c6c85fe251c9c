//! Content backend connection settings

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the monitored content platform lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Origin content API, e.g. `https://abc123.api.example.io`
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Cached query API sitting in front of the origin
    #[serde(default = "default_cdn_url")]
    pub cdn_url: String,
    /// Asset CDN base URL
    #[serde(default = "default_asset_url")]
    pub asset_url: String,
    /// Dataset queried by probes and tests
    #[serde(default = "default_dataset")]
    pub dataset: String,
    /// API version path segment
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Read token sent as a bearer credential
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            cdn_url: default_cdn_url(),
            asset_url: default_asset_url(),
            dataset: default_dataset(),
            api_version: default_api_version(),
            token: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl BackendConfig {
    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_api_url() -> String {
    "http://localhost:3333".to_string()
}

fn default_cdn_url() -> String {
    "http://localhost:3333".to_string()
}

fn default_asset_url() -> String {
    "http://localhost:3333".to_string()
}

fn default_dataset() -> String {
    "production".to_string()
}

fn default_api_version() -> String {
    "v2021-10-21".to_string()
}
