//! Process manager for coordinating logical processes.
//!
//! [`ProcessManager`] is the single notification a process sends when it
//! terminates. [`ProcessTable`] is the session's implementation: it assigns
//! pids, spawns a thread per process, keeps the set of active processes and
//! publishes lifecycle events.

use crate::connection::Connection;
use crate::execution::Execution;
use crate::state::process::Process;
use parking_lot::Mutex;
use pl_protocol::{CommandResult, Event, ProcessInfo, SessionConfig, Signal};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use std::thread::JoinHandle;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

/// Receives the terminal notification of every process it manages.
pub trait ProcessManager: Send + Sync {
    /// Called exactly once per process, after the process has restored the
    /// connection's handlers.
    fn process_finished(&self, process: &Process);
}

/// Errors returned by [`ProcessTable`] operations.
#[derive(Error, Debug)]
pub enum ManagerError {
    /// No active process has this pid.
    #[error("Process {0} not found")]
    NotFound(u32),

    /// The process thread could not be spawned.
    #[error("Failed to spawn process thread: {source}")]
    Spawn { source: std::io::Error },
}

/// Handle to a started process.
#[derive(Debug)]
pub struct ProcessHandle {
    process: Arc<Process>,
    thread: JoinHandle<()>,
}

impl ProcessHandle {
    /// Pid of the started process.
    pub fn pid(&self) -> u32 {
        self.process.pid()
    }

    /// The started process.
    pub fn process(&self) -> &Arc<Process> {
        &self.process
    }

    /// Wait for the process thread to finish and return the recorded result.
    pub fn join(self) -> Option<CommandResult> {
        if self.thread.join().is_err() {
            tracing::warn!(pid = self.process.pid(), "process thread panicked");
        }
        self.process.result()
    }
}

/// Manages all active logical processes of a session.
///
/// The ProcessTable provides:
/// - Pid assignment
/// - Starting processes on their own threads
/// - Routing signals to a process by pid
/// - Querying the active set
pub struct ProcessTable {
    /// Active processes, indexed by pid.
    processes: Mutex<HashMap<u32, Arc<Process>>>,

    /// Next pid to hand out.
    next_pid: AtomicU32,

    /// The session's connection, shared with every process.
    connection: Arc<dyn Connection>,

    /// Terminator for failure messages written by processes.
    line_separator: String,

    /// Channel for lifecycle events.
    events_tx: UnboundedSender<Event>,
}

impl ProcessTable {
    /// Create a new ProcessTable.
    ///
    /// # Arguments
    ///
    /// * `connection` - Connection shared by all processes
    /// * `config` - Session settings
    /// * `events_tx` - Channel for lifecycle events
    pub fn new(
        connection: Arc<dyn Connection>,
        config: &SessionConfig,
        events_tx: UnboundedSender<Event>,
    ) -> Arc<Self> {
        Arc::new(Self {
            processes: Mutex::new(HashMap::new()),
            next_pid: AtomicU32::new(1),
            connection,
            line_separator: config.line_separator.clone(),
            events_tx,
        })
    }

    /// Register a pending process for `execution` without starting it.
    ///
    /// The process stays in the table until it has run, so the caller must
    /// `run()` it or remove it again.
    pub(crate) fn create(self: &Arc<Self>, execution: Box<dyn Execution>) -> Arc<Process> {
        let pid = self.next_pid.fetch_add(1, Ordering::Relaxed);
        let table: Weak<ProcessTable> = Arc::downgrade(self);
        let manager: Weak<dyn ProcessManager> = table;
        let process = Arc::new(
            Process::new(pid, manager, Arc::clone(&self.connection), execution)
                .with_line_separator(self.line_separator.clone()),
        );

        self.processes.lock().insert(pid, Arc::clone(&process));
        process
    }

    /// Start `execution` as a new process on its own thread.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Spawn`] if the thread cannot be created; the
    /// process is removed from the table in that case.
    pub fn start(self: &Arc<Self>, execution: Box<dyn Execution>) -> Result<ProcessHandle, ManagerError> {
        let process = self.create(execution);
        let pid = process.pid();

        let table = Arc::clone(self);
        let runner = Arc::clone(&process);
        let thread = std::thread::Builder::new()
            .name(format!("process-{pid}"))
            .spawn(move || {
                table.announce(&runner);
                runner.run();
            })
            .map_err(|source| {
                self.processes.lock().remove(&pid);
                ManagerError::Spawn { source }
            })?;

        Ok(ProcessHandle { process, thread })
    }

    /// Publish the start of `process`. Runs on the process thread so that
    /// the started event always precedes the finished one.
    fn announce(&self, process: &Process) {
        tracing::debug!(pid = process.pid(), command = %process.command(), "process started");
        let _ = self.events_tx.send(Event::ProcessStarted {
            pid: process.pid(),
            command: process.command().to_string(),
            started_at: chrono::Utc::now(),
        });
    }

    /// Deliver `signal` to the process `pid`.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::NotFound`] if no active process has this pid.
    pub fn signal(&self, pid: u32, signal: Signal) -> Result<(), ManagerError> {
        let process = self.get_process(pid).ok_or(ManagerError::NotFound(pid))?;
        process.accept(signal);
        Ok(())
    }

    /// Get an active process by pid.
    pub fn get_process(&self, pid: u32) -> Option<Arc<Process>> {
        self.processes.lock().get(&pid).cloned()
    }

    /// Snapshots of all active processes, ordered by pid.
    pub fn active_processes(&self) -> Vec<ProcessInfo> {
        let mut infos: Vec<ProcessInfo> = self
            .processes
            .lock()
            .values()
            .map(|process| process.info())
            .collect();
        infos.sort_by_key(|info| info.pid);
        infos
    }

    /// Get the number of active processes.
    pub fn process_count(&self) -> usize {
        self.processes.lock().len()
    }
}

impl ProcessManager for ProcessTable {
    fn process_finished(&self, process: &Process) {
        self.processes.lock().remove(&process.pid());

        let result = process.result();
        tracing::debug!(pid = process.pid(), ?result, "process finished");
        let _ = self.events_tx.send(Event::ProcessFinished {
            pid: process.pid(),
            command: process.command().to_string(),
            result,
            finished_at: chrono::Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::BufferConnection;
    use crate::execution::{CommandError, ExecutionContext};
    use tokio::sync::mpsc;

    struct Immediate {
        result: Option<CommandResult>,
    }

    impl Execution for Immediate {
        fn execute(&mut self, _context: &ExecutionContext) -> Result<CommandResult, CommandError> {
            Ok(CommandResult::Success)
        }

        fn set_result(&mut self, result: CommandResult) {
            self.result = Some(result);
        }

        fn result(&self) -> Option<CommandResult> {
            self.result
        }

        fn command(&self) -> &str {
            "immediate"
        }
    }

    fn table() -> (Arc<ProcessTable>, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let table = ProcessTable::new(
            Arc::new(BufferConnection::new()),
            &SessionConfig::default(),
            tx,
        );
        (table, rx)
    }

    #[tokio::test]
    async fn test_process_table_new() {
        let (table, _rx) = table();
        assert_eq!(table.process_count(), 0);
        assert!(table.active_processes().is_empty());
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_pids() {
        let (table, _rx) = table();
        let first = table.create(Box::new(Immediate { result: None }));
        let second = table.create(Box::new(Immediate { result: None }));

        assert_eq!(first.pid(), 1);
        assert_eq!(second.pid(), 2);
        assert_eq!(table.process_count(), 2);

        let pids: Vec<u32> = table.active_processes().iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_start_and_join() {
        let (table, mut rx) = table();
        let handle = table.start(Box::new(Immediate { result: None })).unwrap();
        let pid = handle.pid();

        assert_eq!(handle.join(), Some(CommandResult::Success));
        assert_eq!(table.process_count(), 0);
        assert!(table.get_process(pid).is_none());

        let started = rx.recv().await.unwrap();
        assert!(matches!(started, Event::ProcessStarted { pid: p, .. } if p == pid));
        let finished = rx.recv().await.unwrap();
        assert!(matches!(
            finished,
            Event::ProcessFinished { result: Some(CommandResult::Success), .. }
        ));
    }

    #[tokio::test]
    async fn test_signal_unknown_pid() {
        let (table, _rx) = table();
        let result = table.signal(99, Signal::Int);
        assert!(matches!(result, Err(ManagerError::NotFound(99))));
    }

    #[tokio::test]
    async fn test_created_process_leaves_table_after_run() {
        let (table, mut rx) = table();
        let process = table.create(Box::new(Immediate { result: None }));
        assert_eq!(table.process_count(), 1);

        process.run();

        assert_eq!(table.process_count(), 0);
        assert!(table.get_process(process.pid()).is_none());
        let finished = rx.recv().await.unwrap();
        assert!(matches!(finished, Event::ProcessFinished { pid, .. } if pid == process.pid()));
    }

    #[tokio::test]
    async fn test_signal_pending_process_is_noop() {
        let (table, _rx) = table();
        let process = table.create(Box::new(Immediate { result: None }));

        table.signal(process.pid(), Signal::Int).unwrap();
        process.run();

        assert_eq!(process.result(), Some(CommandResult::Success));
    }
}
