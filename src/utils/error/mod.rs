//! Error handling for the health engine
//!
//! This module defines the engine error type and the abstract response codes
//! shared by the HTTP server and the CLI.

mod response;
mod types;

pub use response::ErrorResponse;
pub use types::{EngineError, ResponseCode, Result};
