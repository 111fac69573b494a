//! In-memory connection that records everything written to it.

use super::{Connection, InputConsumer, SignalConsumer};
use parking_lot::Mutex;

/// A [`Connection`] backed by a string buffer.
///
/// Used for one-shot runs where output is collected rather than shown, and
/// as the connection double in tests.
#[derive(Default)]
pub struct BufferConnection {
    signal_handler: Mutex<Option<SignalConsumer>>,
    stdin_handler: Mutex<Option<InputConsumer>>,
    output: Mutex<String>,
}

impl BufferConnection {
    /// Create an empty connection with no handlers installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn output(&self) -> String {
        self.output.lock().clone()
    }

    /// Take the written output, leaving the buffer empty.
    pub fn take_output(&self) -> String {
        std::mem::take(&mut *self.output.lock())
    }
}

impl Connection for BufferConnection {
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
        self.output.lock().push_str(text);
    }
}
