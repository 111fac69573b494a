//! Lifecycle events published by the process table.
//!
//! The process table sends an [`Event`] over an unbounded channel whenever a
//! logical process starts or finishes. The interactive session consumes them
//! to decide when to redraw the prompt; the binary can also print them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::process_models::CommandResult;

/// Events sent from the core to the session.
///
/// Uses tagged enum serialization:
/// ```json
/// {
///   "type": "processFinished",
///   "payload": {
///     "pid": 3,
///     "command": "sleep 5",
///     "result": "FAILURE",
///     "finished_at": "2026-01-01T00:00:00Z"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A process thread has been spawned.
    ProcessStarted {
        pid: u32,
        command: String,
        started_at: DateTime<Utc>,
    },

    /// A process has terminated and released the connection.
    ///
    /// `result` is `None` only if the execution never recorded one.
    ProcessFinished {
        pid: u32,
        command: String,
        result: Option<CommandResult>,
        finished_at: DateTime<Utc>,
    },
}

impl Event {
    /// The pid the event refers to.
    pub fn pid(&self) -> u32 {
        match self {
            Event::ProcessStarted { pid, .. } | Event::ProcessFinished { pid, .. } => *pid,
        }
    }
}
