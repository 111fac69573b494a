//! Scripted executions and process construction helpers.

use crate::common::managers::RecordingManager;
use pl_core::connection::{BufferConnection, Connection};
use pl_core::execution::{CommandError, Execution, ExecutionContext};
use pl_core::state::{Process, ProcessManager};
use pl_protocol::CommandResult;
use std::sync::mpsc;
use std::sync::{Arc, Weak};
use std::time::Duration;

type Behavior = Box<dyn FnMut(&ExecutionContext) -> Result<CommandResult, CommandError> + Send>;

/// An execution whose `execute` runs a closure.
pub struct ScriptedExecution {
    descriptor: String,
    behavior: Behavior,
    result: Option<CommandResult>,
}

impl ScriptedExecution {
    pub fn new<F>(descriptor: &str, behavior: F) -> Self
    where
        F: FnMut(&ExecutionContext) -> Result<CommandResult, CommandError> + Send + 'static,
    {
        Self {
            descriptor: descriptor.to_string(),
            behavior: Box::new(behavior),
            result: None,
        }
    }

    pub fn succeeding() -> Self {
        Self::new("true", |_| Ok(CommandResult::Success))
    }

    pub fn failing(error: fn() -> CommandError) -> Self {
        Self::new("failing", move |_| Err(error()))
    }

    pub fn panicking(message: &'static str) -> Self {
        Self::new("panicking", move |_| panic!("{}", message))
    }

    /// Blocks until interrupted. Sends on `ready` once it is inside
    /// `execute`.
    pub fn blocking(ready: mpsc::Sender<()>) -> Self {
        Self::new("wait", move |context| {
            let _ = ready.send(());
            context.interrupt().sleep(Duration::from_secs(30))?;
            Ok(CommandResult::Success)
        })
    }
}

impl Execution for ScriptedExecution {
    fn execute(&mut self, context: &ExecutionContext) -> Result<CommandResult, CommandError> {
        (self.behavior)(context)
    }

    fn set_result(&mut self, result: CommandResult) {
        self.result = Some(result);
    }

    fn result(&self) -> Option<CommandResult> {
        self.result
    }

    fn command(&self) -> &str {
        &self.descriptor
    }
}

/// Everything a single-process test needs.
pub struct Harness {
    pub process: Arc<Process>,
    pub manager: Arc<RecordingManager>,
    pub connection: Arc<BufferConnection>,
}

/// Build a pending process with pid 1 around `execution`.
pub fn harness(execution: ScriptedExecution) -> Harness {
    let connection = Arc::new(BufferConnection::new());
    let manager = Arc::new(RecordingManager::new(connection.clone()));
    let weak: Weak<RecordingManager> = Arc::downgrade(&manager);
    let weak: Weak<dyn ProcessManager> = weak;
    let shared: Arc<dyn Connection> = connection.clone();

    let process = Arc::new(Process::new(1, weak, shared, Box::new(execution)));
    Harness {
        process,
        manager,
        connection,
    }
}
