//! HTTP server implementation
//!
//! This module exposes the engine's health and test contracts over actix-web.

pub mod builder;
pub mod routes;
#[allow(clippy::module_inception)]
pub mod server;
pub mod state;


pub use builder::{ServerBuilder, run_server};
pub use server::HttpServer;
pub use state::AppState;
