//! The logical process: one command running on its own thread.
//!
//! A [`Process`] owns an [`Execution`] and runs it with the connection's
//! signal slot routed to itself. Interrupts delivered while it runs raise the
//! process's cancellation token. Whatever happens inside the command, the
//! previous handlers are restored and the manager is told exactly once.

use crate::connection::{Connection, HandlerGuard, SignalConsumer};
use crate::execution::{CommandError, Execution, ExecutionContext, Interrupt};
use crate::signal::{DispatchContext, SignalDispatch};
use crate::state::manager::ProcessManager;
use parking_lot::{Mutex, MutexGuard};
use pl_protocol::{CommandResult, ProcessInfo, ProcessStatus, Signal};
use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

thread_local! {
    static CURRENT_PID: Cell<Option<u32>> = const { Cell::new(None) };
}

/// Pid of the process whose command is executing on the calling thread.
///
/// Panic hooks use this to tell a panic that its process will catch from
/// one that takes the program down.
pub fn current_pid() -> Option<u32> {
    CURRENT_PID.with(Cell::get)
}

/// A logical process wrapping a single execution.
pub struct Process {
    pid: u32,
    command: String,
    execution: Mutex<Box<dyn Execution>>,
    connection: Arc<dyn Connection>,
    manager: Weak<dyn ProcessManager>,
    line_separator: String,
    result: Mutex<Option<CommandResult>>,
    running: AtomicBool,
    status: Mutex<ProcessStatus>,
    interrupt: Interrupt,
}

impl Process {
    /// Create a pending process.
    ///
    /// # Arguments
    ///
    /// * `pid` - Identifier assigned by the manager
    /// * `manager` - Receives the finish notification; not kept alive by the process
    /// * `connection` - The connection whose signal slot the process takes over
    /// * `execution` - The command to run
    pub fn new(
        pid: u32,
        manager: Weak<dyn ProcessManager>,
        connection: Arc<dyn Connection>,
        execution: Box<dyn Execution>,
    ) -> Self {
        let command = execution.command().to_string();
        Self {
            pid,
            command,
            execution: Mutex::new(execution),
            connection,
            manager,
            line_separator: "\n".to_string(),
            result: Mutex::new(None),
            running: AtomicBool::new(false),
            status: Mutex::new(ProcessStatus::Pending),
            interrupt: Interrupt::new(),
        }
    }

    /// Set the terminator written after failure messages.
    pub fn with_line_separator(mut self, separator: impl Into<String>) -> Self {
        self.line_separator = separator.into();
        self
    }

    /// Identifier assigned by the manager.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Descriptor of the command this process runs.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The owned execution.
    ///
    /// The execution is locked for the duration of the run, so this blocks
    /// until the process has terminated if called while it is running.
    pub fn execution(&self) -> MutexGuard<'_, Box<dyn Execution>> {
        self.execution.lock()
    }

    /// The recorded result, `None` until the run has finished.
    ///
    /// Kept apart from the execution so it never waits for the command.
    pub fn result(&self) -> Option<CommandResult> {
        *self.result.lock()
    }

    /// Current lifecycle status.
    pub fn status(&self) -> ProcessStatus {
        *self.status.lock()
    }

    /// Whether the command is currently executing.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Snapshot for listings.
    pub fn info(&self) -> ProcessInfo {
        ProcessInfo {
            pid: self.pid,
            command: self.command.clone(),
            status: self.status(),
        }
    }

    /// Signal delivery entry point.
    ///
    /// Safe to call from any thread at any time. Never blocks on the
    /// command: it only classifies the signal against the running flag and
    /// possibly raises the cancellation token.
    pub fn accept(&self, signal: Signal) {
        let context = DispatchContext {
            pid: self.pid,
            running: self.running.load(Ordering::SeqCst),
            interrupt: self.interrupt.clone(),
        };
        SignalDispatch::global().dispatch(signal, context);
    }

    /// Run the execution to completion on the calling thread.
    ///
    /// Takes over the connection's signal slot, runs the command, records
    /// the outcome, restores the connection's handlers and notifies the
    /// manager, in that order. Nothing the command does escapes this call.
    /// A process runs at most once; later calls are ignored.
    pub fn run(self: &Arc<Self>) {
        if !self.begin() {
            tracing::warn!(pid = self.pid, command = %self.command, "process already started");
            return;
        }

        // Locals drop in reverse order: the execution lock is released, then
        // the handlers are restored, then the manager is notified.
        let _completion = Completion { process: self };
        let _routing = HandlerGuard::install(self.connection.as_ref(), self.signal_consumer());
        self.running.store(true, Ordering::SeqCst);
        tracing::debug!(pid = self.pid, command = %self.command, "process running");

        let mut execution = self.execution.lock();
        let outcome = self.execute(&mut **execution);
        self.running.store(false, Ordering::SeqCst);
        self.record(&mut **execution, outcome);
    }

    /// Move Pending to Running. Returns false if the process was already
    /// started.
    fn begin(&self) -> bool {
        let mut status = self.status.lock();
        if *status != ProcessStatus::Pending {
            return false;
        }
        *status = ProcessStatus::Running;
        true
    }

    fn signal_consumer(self: &Arc<Self>) -> SignalConsumer {
        let process = Arc::downgrade(self);
        Arc::new(move |signal| {
            if let Some(process) = process.upgrade() {
                process.accept(signal);
            }
        })
    }

    fn execute(&self, execution: &mut dyn Execution) -> Result<CommandResult, CommandError> {
        let context = ExecutionContext::new(
            self.pid,
            self.interrupt.clone(),
            Arc::clone(&self.connection),
        )
        .with_line_separator(self.line_separator.as_str());

        let outer = CURRENT_PID.with(|current| current.replace(Some(self.pid)));
        let caught = panic::catch_unwind(AssertUnwindSafe(|| execution.execute(&context)));
        CURRENT_PID.with(|current| current.set(outer));

        let outcome = match caught {
            Ok(outcome) => outcome,
            Err(payload) => Err(CommandError::Fault(anyhow::anyhow!(
                "command panicked: {}",
                panic_message(payload.as_ref())
            ))),
        };

        // An interrupt the command ignored still ends the run as interrupted.
        match outcome {
            Ok(_) if self.interrupt.is_raised() => Err(CommandError::Interrupted),
            outcome => outcome,
        }
    }

    fn record(&self, execution: &mut dyn Execution, outcome: Result<CommandResult, CommandError>) {
        let err = match outcome {
            Ok(result) => {
                execution.set_result(result);
                *self.result.lock() = Some(result);
                tracing::debug!(pid = self.pid, ?result, "command completed");
                return;
            }
            Err(err) => err,
        };

        execution.set_result(CommandResult::Failure);
        *self.result.lock() = Some(CommandResult::Failure);
        match err {
            CommandError::Interrupted => {
                tracing::debug!(pid = self.pid, command = %self.command, "command interrupted");
            }
            CommandError::Fault(fault) => {
                self.connection
                    .write(&format!("{fault}{}", self.line_separator));
                tracing::warn!(
                    pid = self.pid,
                    command = %self.command,
                    error = ?fault,
                    "uncaught error when executing the command"
                );
            }
            err => {
                self.connection
                    .write(&format!("{err}{}", self.line_separator));
            }
        }
    }
}

impl std::fmt::Debug for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Process")
            .field("pid", &self.pid)
            .field("command", &self.command)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// Final transition of a run: runs on every exit path, after the handler
/// guard has restored the connection.
struct Completion<'a> {
    process: &'a Process,
}

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        let process = self.process;
        process.running.store(false, Ordering::SeqCst);
        *process.status.lock() = ProcessStatus::Terminated;

        match process.manager.upgrade() {
            Some(manager) => manager.process_finished(process),
            None => tracing::debug!(pid = process.pid, "manager dropped before process finished"),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}
