//! Scoped ownership of a connection's handler slots.

use super::{Connection, InputConsumer, SignalConsumer};

/// Installs a signal handler on a connection and restores the previous
/// signal and input handlers when dropped.
///
/// Both slots are captured on install. The input slot is not replaced, but a
/// command may install its own input handler while it runs; dropping the
/// guard puts the captured one back either way.
#[must_use = "dropping the guard immediately restores the previous handlers"]
pub struct HandlerGuard<'a> {
    connection: &'a dyn Connection,
    prev_signal: Option<SignalConsumer>,
    prev_input: Option<InputConsumer>,
}

impl<'a> HandlerGuard<'a> {
    /// Capture the current handlers and install `handler` as the signal
    /// handler.
    pub fn install(connection: &'a dyn Connection, handler: SignalConsumer) -> Self {
        let prev_signal = connection.signal_handler();
        let prev_input = connection.stdin_handler();
        connection.set_signal_handler(Some(handler));

        Self {
            connection,
            prev_signal,
            prev_input,
        }
    }
}

impl Drop for HandlerGuard<'_> {
    fn drop(&mut self) {
        self.connection.set_signal_handler(self.prev_signal.take());
        self.connection.set_stdin_handler(self.prev_input.take());
    }
}
