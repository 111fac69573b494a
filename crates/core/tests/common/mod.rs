//! Common test utilities and helpers for process tests.
//!
//! This module provides shared functionality across the integration tests:
//! - Scripted executions with configurable behavior
//! - A manager that records finish notifications
//! - Custom assertions

pub mod assertions;
pub mod fixtures;
pub mod managers;

#[allow(unused_imports)]
pub use assertions::*;
pub use fixtures::*;
pub use managers::*;
