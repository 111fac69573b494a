//! Connection backed by the process's own terminal.

use parking_lot::Mutex;
use pl_core::connection::{Connection, InputConsumer, SignalConsumer};
use std::borrow::Cow;
use std::io::{stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// A [`Connection`] that writes to stdout.
///
/// Signals and raw input are not read here; the session feeds them in from
/// the terminal's event stream through [`Connection::deliver_signal`] and
/// [`Connection::deliver_input`].
#[derive(Default)]
pub struct TerminalConnection {
    signal_handler: Mutex<Option<SignalConsumer>>,
    stdin_handler: Mutex<Option<InputConsumer>>,
    raw: AtomicBool,
}

impl TerminalConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether output is currently translated for raw mode.
    pub fn is_raw(&self) -> bool {
        self.raw.load(Ordering::SeqCst)
    }

    /// Switch newline translation on or off. Set by [`RawMode`](crate::RawMode).
    pub fn set_raw(&self, raw: bool) {
        self.raw.store(raw, Ordering::SeqCst);
    }
}

impl Connection for TerminalConnection {
    fn signal_handler(&self) -> Option<SignalConsumer> {
        self.signal_handler.lock().clone()
    }

    fn set_signal_handler(&self, handler: Option<SignalConsumer>) {
        *self.signal_handler.lock() = handler;
    }

    fn stdin_handler(&self) -> Option<InputConsumer> {
        self.stdin_handler.lock().clone()
    }

    fn set_stdin_handler(&self, handler: Option<InputConsumer>) {
        *self.stdin_handler.lock() = handler;
    }

    fn write(&self, text: &str) {
        let text = if self.is_raw() {
            raw_newlines(text)
        } else {
            Cow::Borrowed(text)
        };

        let mut out = stdout().lock();
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            tracing::debug!(error = %e, "failed to write to terminal");
        }
    }
}

/// Expand bare `\n` to `\r\n`. Raw mode turns off the terminal's own
/// output processing, so a lone line feed would not return the cursor.
pub fn raw_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\n') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    let mut previous = None;
    for c in text.chars() {
        if c == '\n' && previous != Some('\r') {
            out.push('\r');
        }
        out.push(c);
        previous = Some(c);
    }
    Cow::Owned(out)
}
