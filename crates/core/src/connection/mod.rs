//! The terminal connection seen by logical processes.
//!
//! A [`Connection`] holds two swappable handler slots: one receives signals,
//! the other receives raw input. Whoever currently owns the foreground
//! installs itself into the slots and must put the previous values back when
//! it is done; [`HandlerGuard`] does that on drop.

pub mod buffer;
pub mod guard;

pub use buffer::BufferConnection;
pub use guard::HandlerGuard;

use pl_protocol::Signal;
use std::sync::Arc;

/// Receiver installed in a connection's signal slot.
pub type SignalConsumer = Arc<dyn Fn(Signal) + Send + Sync>;

/// Receiver installed in a connection's raw input slot. Input is delivered as
/// Unicode code points.
pub type InputConsumer = Arc<dyn Fn(&[u32]) + Send + Sync>;

/// A terminal-like connection shared by the session and its processes.
///
/// Implementations must be safe to call from any thread: signals are
/// delivered from the terminal's input context while processes write from
/// their own threads.
pub trait Connection: Send + Sync {
    /// The currently installed signal handler, if any.
    fn signal_handler(&self) -> Option<SignalConsumer>;

    /// Replace the signal handler.
    fn set_signal_handler(&self, handler: Option<SignalConsumer>);

    /// The currently installed raw input handler, if any.
    fn stdin_handler(&self) -> Option<InputConsumer>;

    /// Replace the raw input handler.
    fn set_stdin_handler(&self, handler: Option<InputConsumer>);

    /// Write text to the connection's output.
    ///
    /// Writing never fails from the caller's point of view; implementations
    /// log and drop output they cannot deliver.
    fn write(&self, text: &str);

    /// Hand `signal` to the installed signal handler.
    ///
    /// The handler is cloned out of the slot before it is called, so a
    /// handler may itself swap the slots.
    fn deliver_signal(&self, signal: Signal) {
        if let Some(handler) = self.signal_handler() {
            handler(signal);
        }
    }

    /// Hand raw input to the installed input handler.
    fn deliver_input(&self, input: &[u32]) {
        if let Some(handler) = self.stdin_handler() {
            handler(input);
        }
    }
}

/// Whether two optional handlers are the same installed instance.
pub fn same_handler<T: ?Sized>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
