//! Commands available in every session.

use super::Command;
use crate::execution::{CommandError, ExecutionContext};
use pl_protocol::CommandResult;
use std::time::Duration;

/// `echo [words..]`: write the words separated by spaces, then a line
/// separator.
pub struct Echo;

impl Command for Echo {
    fn execute(
        &mut self,
        args: &[String],
        context: &ExecutionContext,
    ) -> Result<CommandResult, CommandError> {
        context.write_line(&args.join(" "));
        Ok(CommandResult::Success)
    }
}

/// `sleep <seconds>`: block until the time elapses or the process is
/// interrupted.
pub struct Sleep;

impl Sleep {
    fn parse_duration(args: &[String]) -> Result<Duration, CommandError> {
        let operand = match args {
            [] => return Err(CommandError::Parse("sleep: missing operand".to_string())),
            [operand] => operand,
            [_, extra, ..] => {
                return Err(CommandError::Parse(format!(
                    "sleep: extra operand '{extra}'"
                )))
            }
        };

        let seconds: f64 = operand.parse().map_err(|_| {
            CommandError::OptionValidation(format!("sleep: invalid time interval '{operand}'"))
        })?;

        Duration::try_from_secs_f64(seconds).map_err(|_| {
            CommandError::Validation(format!(
                "sleep: time interval must be a finite, non-negative number of seconds, got '{operand}'"
            ))
        })
    }
}

impl Command for Sleep {
    fn execute(
        &mut self,
        args: &[String],
        context: &ExecutionContext,
    ) -> Result<CommandResult, CommandError> {
        let duration = Self::parse_duration(args)?;
        context.interrupt().sleep(duration)?;
        Ok(CommandResult::Success)
    }
}

/// `wait`: block until interrupted.
pub struct Wait;

impl Command for Wait {
    fn execute(
        &mut self,
        args: &[String],
        context: &ExecutionContext,
    ) -> Result<CommandResult, CommandError> {
        if let Some(extra) = args.first() {
            return Err(CommandError::Parse(format!("wait: extra operand '{extra}'")));
        }
        loop {
            context.interrupt().sleep(Duration::from_secs(3600))?;
        }
    }
}

/// `fail [message]`: report a command failure.
pub struct Fail;

impl Command for Fail {
    fn execute(
        &mut self,
        args: &[String],
        _context: &ExecutionContext,
    ) -> Result<CommandResult, CommandError> {
        let message = if args.is_empty() {
            "command failed".to_string()
        } else {
            args.join(" ")
        };
        Err(CommandError::Command(message))
    }
}

/// `false`: fail without a message.
pub struct False;

impl Command for False {
    fn execute(
        &mut self,
        _args: &[String],
        _context: &ExecutionContext,
    ) -> Result<CommandResult, CommandError> {
        Ok(CommandResult::Failure)
    }
}

/// `panic [message]`: panic inside the command.
pub struct Panic;

impl Command for Panic {
    fn execute(
        &mut self,
        args: &[String],
        _context: &ExecutionContext,
    ) -> Result<CommandResult, CommandError> {
        let message = if args.is_empty() {
            "explicit panic".to_string()
        } else {
            args.join(" ")
        };
        panic!("{message}");
    }
}
