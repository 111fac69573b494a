//! Command lookup by name.
//!
//! The CommandRegistry maps command names to constructors and turns
//! submitted lines into [`CommandExecution`]s.

use super::builtins::{Echo, Fail, False, Panic, Sleep, Wait};
use super::{Command, CommandExecution};
use crate::execution::CommandError;
use std::collections::BTreeMap;

/// Constructor for a fresh command instance.
pub type CommandFactory = fn() -> Box<dyn Command>;

/// Registry of the commands a session can run.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandFactory>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the builtin commands.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("echo", || Box::new(Echo));
        registry.register("sleep", || Box::new(Sleep));
        registry.register("wait", || Box::new(Wait));
        registry.register("fail", || Box::new(Fail));
        registry.register("false", || Box::new(False));
        registry.register("panic", || Box::new(Panic));
        registry
    }

    /// Register (or replace) the command `name`.
    pub fn register(&mut self, name: impl Into<String>, factory: CommandFactory) {
        self.commands.insert(name.into(), factory);
    }

    /// Whether a command is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    /// Parse a submitted line.
    ///
    /// Words are separated by whitespace; the first word names the command.
    ///
    /// # Returns
    ///
    /// `Ok(None)` for a blank line.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NotFound`] if the first word is not a
    /// registered command.
    pub fn parse(&self, line: &str) -> Result<Option<CommandExecution>, CommandError> {
        let mut words = line.split_whitespace().map(str::to_string);
        let Some(name) = words.next() else {
            return Ok(None);
        };

        let factory = self
            .commands
            .get(&name)
            .ok_or_else(|| CommandError::NotFound(name.clone()))?;

        Ok(Some(CommandExecution::new(
            line.trim(),
            factory(),
            words.collect(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Execution;

    #[test]
    fn test_builtin_names() {
        let registry = CommandRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec!["echo", "fail", "false", "panic", "sleep", "wait"]
        );
        assert!(registry.contains("sleep"));
        assert!(!registry.contains("exit"));
    }

    #[test]
    fn test_parse_blank_line() {
        let registry = CommandRegistry::with_builtins();
        assert!(registry.parse("").unwrap().is_none());
        assert!(registry.parse("   \t").unwrap().is_none());
    }

    #[test]
    fn test_parse_splits_arguments() {
        let registry = CommandRegistry::with_builtins();
        let execution = registry.parse("  sleep   0.5 ").unwrap().unwrap();

        assert_eq!(execution.command(), "sleep   0.5");
        assert_eq!(execution.args(), ["0.5".to_string()]);
        assert!(execution.result().is_none());
    }

    #[test]
    fn test_parse_unknown_command() {
        let registry = CommandRegistry::with_builtins();
        let result = registry.parse("frobnicate now");

        match result {
            Err(err @ CommandError::NotFound(_)) => {
                assert_eq!(err.to_string(), "frobnicate: command not found");
            }
            _ => panic!("expected NotFound"),
        }
    }

    #[test]
    fn test_register_custom_command() {
        let mut registry = CommandRegistry::new();
        registry.register("nope", || Box::new(False));
        assert_eq!(registry.names(), vec!["nope"]);
        assert!(registry.parse("nope").unwrap().is_some());
        assert!(registry.parse("echo hi").is_err());
    }
}
