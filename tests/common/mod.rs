//! Common test utilities for platform-health

pub mod backend;

pub use assertions::SnapshotAssertions;
pub use backend::{FakeBackend, Reply};
pub use fixtures::{ConfigFactory, system_with};
