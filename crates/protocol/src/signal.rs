//! Signal kinds delivered by the terminal layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An asynchronous event raised by the terminal connection.
///
/// Signals carry no payload. Only [`Signal::Int`] has behavior attached to it
/// in the core; the remaining kinds are routed but ignored until a handler is
/// registered for them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    /// Interrupt (Ctrl-C).
    Int,
    /// Quit (Ctrl-\).
    Quit,
    /// Suspend (Ctrl-Z).
    Susp,
    /// Continue after a suspend.
    Cont,
    /// End of input (Ctrl-D).
    Eof,
    /// Status request (Ctrl-T).
    Info,
    /// The terminal window changed size.
    Winch,
}

impl Signal {
    /// All signal kinds, in declaration order.
    pub const ALL: [Signal; 7] = [
        Signal::Int,
        Signal::Quit,
        Signal::Susp,
        Signal::Cont,
        Signal::Eof,
        Signal::Info,
        Signal::Winch,
    ];

    /// Conventional short name (`INT`, `WINCH`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Signal::Int => "INT",
            Signal::Quit => "QUIT",
            Signal::Susp => "SUSP",
            Signal::Cont => "CONT",
            Signal::Eof => "EOF",
            Signal::Info => "INFO",
            Signal::Winch => "WINCH",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_signal_names_are_unique() {
        let names: HashSet<_> = Signal::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), Signal::ALL.len());
    }

    #[test]
    fn test_signal_display() {
        assert_eq!(Signal::Int.to_string(), "INT");
        assert_eq!(Signal::Winch.to_string(), "WINCH");
    }
}
