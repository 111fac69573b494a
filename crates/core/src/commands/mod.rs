//! Builtin command pipeline.
//!
//! This module turns a submitted line into an [`Execution`]: the
//! [`CommandRegistry`] looks up the first word, and the resulting
//! [`CommandExecution`] runs the [`Command`] with the remaining words.

pub mod builtins;
pub mod registry;

pub use registry::CommandRegistry;

use crate::execution::{CommandError, Execution, ExecutionContext};
use pl_protocol::CommandResult;

/// A command that can be run by a process.
pub trait Command: Send {
    /// Run with the words following the command name.
    fn execute(
        &mut self,
        args: &[String],
        context: &ExecutionContext,
    ) -> Result<CommandResult, CommandError>;
}

/// A parsed command line ready to be handed to a process.
pub struct CommandExecution {
    line: String,
    args: Vec<String>,
    command: Box<dyn Command>,
    result: Option<CommandResult>,
}

impl CommandExecution {
    /// Wrap `command` with its arguments; `line` is kept as the descriptor.
    pub fn new(line: impl Into<String>, command: Box<dyn Command>, args: Vec<String>) -> Self {
        Self {
            line: line.into(),
            args,
            command,
            result: None,
        }
    }

    /// Arguments passed to the command.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Execution for CommandExecution {
    fn execute(&mut self, context: &ExecutionContext) -> Result<CommandResult, CommandError> {
        self.command.execute(&self.args, context)
    }

    fn set_result(&mut self, result: CommandResult) {
        self.result = Some(result);
    }

    fn result(&self) -> Option<CommandResult> {
        self.result
    }

    fn command(&self) -> &str {
        &self.line
    }
}
