//! In-memory content backend
//!
//! Answers the way a small, healthy dataset would until told otherwise.

use async_trait::async_trait;
use parking_lot::Mutex;
use platform_health::backend::{
    AssetResponse, BackendError, BackendResult, ContentBackend, QueryResponse,
};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// How the fake answers a category of calls
#[derive(Debug, Clone)]
pub enum Reply {
    Ok,
    Fail(BackendError),
    /// Never answers within any sane test bound
    Hang,
}

#[derive(Debug)]
struct State {
    ping: Reply,
    queries: Reply,
    latency: Duration,
    cache_pattern: Vec<Option<bool>>,
    failing_queries: Vec<String>,
    document_types: Vec<String>,
    document_count: u64,
    asset: AssetResponse,
}

#[derive(Debug)]
pub struct FakeBackend {
    state: Mutex<State>,
    calls: AtomicUsize,
    cached_calls: AtomicUsize,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::healthy()
    }
}

impl FakeBackend {
    pub fn healthy() -> Self {
        Self {
            state: Mutex::new(State {
                ping: Reply::Ok,
                queries: Reply::Ok,
                latency: Duration::ZERO,
                cache_pattern: vec![Some(true)],
                failing_queries: Vec::new(),
                document_types: vec!["author".to_string(), "course".to_string(), "lesson".to_string()],
                document_count: 42,
                asset: AssetResponse {
                    status: 200,
                    content_type: Some("image/png".to_string()),
                    content_length: 68,
                    cache_hit: Some(true),
                },
            }),
            calls: AtomicUsize::new(0),
            cached_calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails as unreachable
    pub fn down() -> Self {
        let backend = Self::healthy();
        let refused = Reply::Fail(BackendError::Unreachable("connection refused".to_string()));
        backend.set_ping(refused.clone());
        backend.set_queries(refused);
        backend.set_asset_status(503);
        backend
    }

    pub fn set_ping(&self, reply: Reply) {
        self.state.lock().ping = reply;
    }

    pub fn set_queries(&self, reply: Reply) {
        self.state.lock().queries = reply;
    }

    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().latency = latency;
    }

    /// Cache header per cached call, cycled
    pub fn set_cache_pattern(&self, pattern: Vec<Option<bool>>) {
        self.state.lock().cache_pattern = pattern;
    }

    pub fn fail_query(&self, query: &str) {
        self.state.lock().failing_queries.push(query.to_string());
    }

    pub fn set_document_types(&self, types: &[&str]) {
        self.state.lock().document_types = types.iter().map(|t| t.to_string()).collect();
    }

    pub fn set_document_count(&self, count: u64) {
        self.state.lock().document_count = count;
    }

    pub fn set_asset_status(&self, status: u16) {
        self.state.lock().asset.status = status;
    }

    pub fn set_asset_length(&self, length: u64) {
        self.state.lock().asset.content_length = length;
    }

    /// Total backend calls of any kind
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn respond(&self, reply: Reply, latency: Duration) -> BackendResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        match reply {
            Reply::Ok => Ok(()),
            Reply::Fail(err) => Err(err),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(BackendError::Timeout(3_600_000))
            }
        }
    }

    fn result_for(&self, query: &str) -> BackendResult<Value> {
        let state = self.state.lock();
        if state.failing_queries.iter().any(|q| q == query) {
            return Err(BackendError::Query(format!("syntax error in `{}`", query)));
        }
        Ok(match query {
            "count(*)" => json!(state.document_count),
            "array::unique(*[]._type)" => json!(state.document_types),
            _ => json!([]),
        })
    }
}

#[async_trait]
impl ContentBackend for FakeBackend {
    async fn ping(&self) -> BackendResult<()> {
        let (reply, latency) = {
            let state = self.state.lock();
            (state.ping.clone(), state.latency)
        };
        self.respond(reply, latency).await
    }

    async fn query(&self, query: &str) -> BackendResult<QueryResponse> {
        let (reply, latency) = {
            let state = self.state.lock();
            (state.queries.clone(), state.latency)
        };
        self.respond(reply, latency).await?;

        Ok(QueryResponse {
            result: self.result_for(query)?,
            server_ms: Some(3),
            cache_hit: None,
        })
    }

    async fn cached_query(&self, query: &str) -> BackendResult<QueryResponse> {
        let (reply, latency) = {
            let state = self.state.lock();
            (state.queries.clone(), state.latency)
        };
        self.respond(reply, latency).await?;

        let index = self.cached_calls.fetch_add(1, Ordering::SeqCst);
        let cache_hit = {
            let state = self.state.lock();
            if state.cache_pattern.is_empty() {
                None
            } else {
                state.cache_pattern[index % state.cache_pattern.len()]
            }
        };

        Ok(QueryResponse {
            result: self.result_for(query)?,
            server_ms: Some(1),
            cache_hit,
        })
    }

    async fn fetch_asset(&self, _path: &str) -> BackendResult<AssetResponse> {
        let (reply, latency, asset) = {
            let state = self.state.lock();
            let reply = match &state.queries {
                Reply::Hang => Reply::Hang,
                _ => Reply::Ok,
            };
            (reply, state.latency, state.asset.clone())
        };
        self.respond(reply, latency).await?;
        Ok(asset)
    }
}
