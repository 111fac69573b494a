//! # pl-protocol
//!
//! Core protocol definitions and data models for procline.
//!
//! This crate defines the shared data structures used for:
//! - Signals delivered by the terminal layer
//! - Runtime process state and command results
//! - Session configuration (`procline.toml`)
//! - Lifecycle events published by the process table
//!
//! ## Modules
//!
//! - [`signal`]: Terminal signal kinds
//! - [`process_models`]: Process status, command results and snapshots
//! - [`config_models`]: Session configuration
//! - [`ipc`]: Lifecycle events sent from the core to the session
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde and chrono
//! - Independent compilation: No dependencies on other procline crates

pub mod config_models;
pub mod ipc;
pub mod process_models;
pub mod signal;

// Re-export all public types for convenience
pub use config_models::*;
pub use ipc::*;
pub use process_models::*;
pub use signal::*;
