//! On-demand component tests
//!
//! Independent of the snapshot path: a test targets one component, runs once
//! and reports a timed pass/fail result.

mod guard;
mod runner;
pub mod types;


pub use guard::QueryGuard;
pub use runner::TestRunner;
pub use types::{TestPlan, TestRequest, TestResult, TestType};
