//! Raw mode setup and restoration.

use crate::connection::TerminalConnection;
use anyhow::Result;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use pl_core::state::current_pid;
use std::io::stdout;
use std::sync::{Arc, Once};

/// Keeps the terminal in raw mode for as long as it is alive.
///
/// While raw, key presses reach the session one at a time and Ctrl-C
/// arrives as a key instead of terminating the program. Dropping the guard
/// restores the terminal.
pub struct RawMode {
    connection: Arc<TerminalConnection>,
}

impl RawMode {
    /// Enter raw mode and enable bracketed paste.
    pub fn enable(connection: Arc<TerminalConnection>) -> Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnableBracketedPaste)?;

        // Set panic hook to restore terminal on panic
        set_panic_hook();

        connection.set_raw(true);
        Ok(Self { connection })
    }

    /// Leave raw mode.
    pub fn restore(&mut self) -> Result<()> {
        self.connection.set_raw(false);
        disable_raw_mode()?;
        execute!(stdout(), DisableBracketedPaste)?;
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            tracing::debug!(error = %e, "failed to restore terminal");
        }
    }
}

/// Set a panic hook that restores the terminal before panicking. Installed
/// once per program.
///
/// Panics inside a command are caught by its process and the session goes
/// on, so the terminal stays raw for those.
fn set_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            if current_pid().is_none() {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), DisableBracketedPaste);
            }
            original_hook(panic_info);
        }));
    });
}
