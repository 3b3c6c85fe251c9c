//! Utility modules for the health engine
//!
//! - **error**: engine error type and response codes
//! - **logging**: tracing subscriber setup

pub mod error;
pub mod logging;

pub use error::{EngineError, ResponseCode, Result};
