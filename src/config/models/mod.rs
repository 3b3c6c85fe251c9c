//! Configuration data models
//!
//! This module defines all configuration structures used by the health engine.

pub mod aggregation;
pub mod backend;
pub mod engine;
pub mod logging;
pub mod probes;
pub mod server;
pub mod testing;

// Re-export all configuration types
pub use aggregation::*;
pub use backend::*;
pub use engine::*;
pub use logging::*;
pub use probes::*;
pub use server::*;
pub use testing::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8090
}

/// Default per-request backend timeout in milliseconds
pub fn default_request_timeout_ms() -> u64 {
    4_000
}

/// Default per-probe timeout in milliseconds
pub fn default_probe_timeout_ms() -> u64 {
    5_000
}

/// Default quick-mode aggregation bound in milliseconds
pub fn default_quick_timeout_ms() -> u64 {
    5_000
}

/// Default full-mode aggregation bound in milliseconds
pub fn default_full_timeout_ms() -> u64 {
    10_000
}

/// Default quick snapshot TTL in seconds
pub fn default_quick_ttl_secs() -> u64 {
    30
}

/// Default full snapshot TTL in seconds
pub fn default_full_ttl_secs() -> u64 {
    60
}

pub fn default_true() -> bool {
    true
}
