//! A process manager that records what it was told.

use parking_lot::Mutex;
use pl_core::connection::{BufferConnection, Connection, InputConsumer, SignalConsumer};
use pl_core::state::{Process, ProcessManager};
use pl_protocol::{CommandResult, ProcessStatus};
use std::sync::Arc;

/// What the manager saw when a process reported itself finished.
pub struct Finished {
    pub pid: u32,
    pub status: ProcessStatus,
    pub running: bool,
    pub result: Option<CommandResult>,
    pub signal_handler: Option<SignalConsumer>,
    pub stdin_handler: Option<InputConsumer>,
}

pub struct RecordingManager {
    connection: Arc<BufferConnection>,
    finished: Mutex<Vec<Finished>>,
}

impl RecordingManager {
    pub fn new(connection: Arc<BufferConnection>) -> Self {
        Self {
            connection,
            finished: Mutex::new(Vec::new()),
        }
    }

    pub fn finished_count(&self) -> usize {
        self.finished.lock().len()
    }

    pub fn finished_pids(&self) -> Vec<u32> {
        self.finished.lock().iter().map(|f| f.pid).collect()
    }

    /// Run `f` against the single recorded notification.
    pub fn with_only<R>(&self, f: impl FnOnce(&Finished) -> R) -> R {
        let finished = self.finished.lock();
        assert_eq!(finished.len(), 1, "expected exactly one notification");
        f(&finished[0])
    }
}

impl ProcessManager for RecordingManager {
    fn process_finished(&self, process: &Process) {
        self.finished.lock().push(Finished {
            pid: process.pid(),
            status: process.status(),
            running: process.is_running(),
            result: process.result(),
            signal_handler: self.connection.signal_handler(),
            stdin_handler: self.connection.stdin_handler(),
        });
    }
}
