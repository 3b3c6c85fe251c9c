//! Integration tests for platform-health
//!
//! These exercise the engine end to end against an in-memory backend, a
//! wiremock HTTP server, or the actix test server.

pub mod aggregation_tests;
pub mod http_backend_tests;
pub mod probe_tests;
pub mod server_tests;
