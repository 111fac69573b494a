//! Failure taxonomy for command execution.
//!
//! Every way a command can fail is one [`CommandError`] variant. The process
//! running the command sorts them into three outcomes: structured failures
//! are reported to the user, interruption is silent, and faults are reported
//! and logged.

use thiserror::Error;

/// Errors a command can return from [`Execution::execute`].
///
/// [`Execution::execute`]: crate::execution::Execution::execute
#[derive(Error, Debug)]
pub enum CommandError {
    /// The command line could not be parsed.
    #[error("{0}")]
    Parse(String),

    /// An option value was rejected.
    #[error("{0}")]
    OptionValidation(String),

    /// The command as a whole was rejected before running.
    #[error("{0}")]
    Validation(String),

    /// The command itself reported a failure.
    #[error("{0}")]
    Command(String),

    /// No command is registered under this name.
    #[error("{0}: command not found")]
    NotFound(String),

    /// The command observed a cooperative interrupt and stopped.
    #[error("interrupted")]
    Interrupted,

    /// Anything else that went wrong.
    #[error(transparent)]
    Fault(#[from] anyhow::Error),
}

impl CommandError {
    /// Whether this failure belongs to the structured set whose message is
    /// shown to the user without further logging.
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            CommandError::Parse(_)
                | CommandError::OptionValidation(_)
                | CommandError::Validation(_)
                | CommandError::Command(_)
                | CommandError::NotFound(_)
        )
    }
}
