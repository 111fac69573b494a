//! Logical processes and their management.
//!
//! This module provides:
//! - [`Process`], the unit that runs one command on its own thread
//! - [`ProcessManager`], the notification contract, and [`ProcessTable`],
//!   the session's process registry

pub mod manager;
pub mod process;

pub use manager::{ManagerError, ProcessHandle, ProcessManager, ProcessTable};
pub use process::{current_pid, Process};
