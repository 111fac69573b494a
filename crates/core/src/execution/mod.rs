//! The unit of work a logical process runs.
//!
//! An [`Execution`] is produced by the command pipeline and handed to a
//! process, which calls [`Execution::execute`] on its own thread and records
//! the outcome in the execution's result slot.

pub mod error;
pub mod interrupt;

pub use error::CommandError;
pub use interrupt::Interrupt;

use crate::connection::Connection;
use pl_protocol::CommandResult;
use std::sync::Arc;

/// A runnable command together with its result slot.
pub trait Execution: Send {
    /// Run the command. May block; blocking points should observe
    /// `context.interrupt()`.
    fn execute(&mut self, context: &ExecutionContext) -> Result<CommandResult, CommandError>;

    /// Record the outcome of the run.
    fn set_result(&mut self, result: CommandResult);

    /// The recorded outcome, once the run has finished.
    fn result(&self) -> Option<CommandResult>;

    /// Human-readable descriptor of the command, used in diagnostics.
    fn command(&self) -> &str;
}

/// What a running command can see of its surroundings.
#[derive(Clone)]
pub struct ExecutionContext {
    pid: u32,
    interrupt: Interrupt,
    connection: Arc<dyn Connection>,
    line_separator: String,
}

impl ExecutionContext {
    /// Create a context for the process `pid`. Lines end in `\n` unless
    /// [`with_line_separator`](Self::with_line_separator) says otherwise.
    pub fn new(pid: u32, interrupt: Interrupt, connection: Arc<dyn Connection>) -> Self {
        Self {
            pid,
            interrupt,
            connection,
            line_separator: "\n".to_string(),
        }
    }

    /// Set the terminator used by [`write_line`](Self::write_line).
    pub fn with_line_separator(mut self, separator: impl Into<String>) -> Self {
        self.line_separator = separator.into();
        self
    }

    /// Identifier of the process running the command.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// The process's cancellation token.
    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    /// The connection the command's output goes to.
    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    /// Write text to the connection.
    pub fn write(&self, text: &str) {
        self.connection.write(text);
    }

    /// Write text followed by the session's line separator.
    pub fn write_line(&self, text: &str) {
        self.connection
            .write(&format!("{text}{}", self.line_separator));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::BufferConnection;

    #[test]
    fn test_write_line_uses_separator() {
        let connection = Arc::new(BufferConnection::new());
        let context = ExecutionContext::new(7, Interrupt::new(), connection.clone());
        context.write_line("plain");

        let context = context.with_line_separator("\r\n");
        context.write_line("raw");
        context.write("no end");

        assert_eq!(connection.output(), "plain\nraw\r\nno end");
        assert_eq!(context.pid(), 7);
    }
}
