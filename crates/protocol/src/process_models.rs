//! Runtime process state models.
//!
//! This module defines the structures for tracking the state of logical
//! processes and the outcome of the commands they run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the lifecycle status of a logical process.
///
/// The status only moves forward:
/// Pending -> Running -> Terminated
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStatus {
    /// Process has been created but its thread has not begun running yet.
    Pending,

    /// Process is executing its command.
    Running,

    /// Process has finished, restored the connection and notified its manager.
    Terminated,
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProcessStatus::Pending => "pending",
            ProcessStatus::Running => "running",
            ProcessStatus::Terminated => "terminated",
        };
        f.write_str(label)
    }
}

/// Outcome recorded on an execution once its command has run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandResult {
    /// The command completed normally.
    Success,

    /// The command failed, was rejected or was interrupted.
    Failure,

    /// The command gave up voluntarily.
    Aborted,
}

impl CommandResult {
    /// Whether this is [`CommandResult::Success`].
    pub fn is_success(self) -> bool {
        matches!(self, CommandResult::Success)
    }

    /// Exit status reported to the host shell.
    pub fn exit_code(self) -> i32 {
        match self {
            CommandResult::Success => 0,
            CommandResult::Failure => 1,
            CommandResult::Aborted => 130,
        }
    }
}

/// Point-in-time snapshot of a logical process.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    /// Identifier assigned by the process table.
    pub pid: u32,

    /// The command line the process was started for.
    pub command: String,

    /// Current lifecycle status.
    pub status: ProcessStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CommandResult::Success.exit_code(), 0);
        assert_eq!(CommandResult::Failure.exit_code(), 1);
        assert_eq!(CommandResult::Aborted.exit_code(), 130);
    }

    #[test]
    fn test_is_success() {
        assert!(CommandResult::Success.is_success());
        assert!(!CommandResult::Failure.is_success());
        assert!(!CommandResult::Aborted.is_success());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ProcessStatus::Pending.to_string(), "pending");
        assert_eq!(ProcessStatus::Running.to_string(), "running");
        assert_eq!(ProcessStatus::Terminated.to_string(), "terminated");
    }
}
