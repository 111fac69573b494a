//! Mapping from delivered signals to handling behavior.
//!
//! Each signal kind is looked up in a [`SignalDispatch`] table that yields a
//! [`SignalHandler`] for that delivery. Kinds without an entry get
//! [`NoopSignalHandler`]. Supporting a new kind means writing a handler and
//! registering a factory for it; callers keep calling
//! [`SignalDispatch::dispatch`].

use crate::execution::Interrupt;
use pl_protocol::Signal;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Behavior selected for one signal delivery.
pub trait SignalHandler {
    fn handle_signal(&self);
}

/// State of the receiving process, sampled when the signal is delivered.
#[derive(Debug, Clone)]
pub struct DispatchContext {
    /// Pid of the receiving process, for logging.
    pub pid: u32,
    /// Whether the process was running at delivery time.
    pub running: bool,
    /// The process's cancellation token.
    pub interrupt: Interrupt,
}

/// Builds the handler for one delivery.
pub type HandlerFactory = fn(DispatchContext) -> Box<dyn SignalHandler>;

/// Interrupt handling: raise the process's cancellation token, but only if
/// the process was running when the signal arrived.
pub struct IntSignalHandler {
    pid: u32,
    running: bool,
    interrupt: Interrupt,
}

impl IntSignalHandler {
    pub fn new(context: DispatchContext) -> Self {
        Self {
            pid: context.pid,
            running: context.running,
            interrupt: context.interrupt,
        }
    }
}

impl SignalHandler for IntSignalHandler {
    fn handle_signal(&self) {
        if self.running {
            tracing::info!(pid = self.pid, "got interrupted in process");
            self.interrupt.raise();
        }
    }
}

/// Does nothing. Used for every kind without a registered handler.
pub struct NoopSignalHandler;

impl SignalHandler for NoopSignalHandler {
    fn handle_signal(&self) {}
}

fn int_handler(context: DispatchContext) -> Box<dyn SignalHandler> {
    Box::new(IntSignalHandler::new(context))
}

/// Lookup table from signal kind to handler factory.
#[derive(Clone, Default)]
pub struct SignalDispatch {
    handlers: HashMap<Signal, HandlerFactory>,
}

static STANDARD: LazyLock<SignalDispatch> = LazyLock::new(SignalDispatch::standard);

impl SignalDispatch {
    /// A table with no entries: every signal is a no-op.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The table used by processes: only [`Signal::Int`] has a handler.
    pub fn standard() -> Self {
        let mut dispatch = Self::empty();
        dispatch.register(Signal::Int, int_handler);
        dispatch
    }

    /// Shared instance of [`SignalDispatch::standard`], built on first use.
    pub fn global() -> &'static SignalDispatch {
        &STANDARD
    }

    /// Register (or replace) the factory for `signal`.
    pub fn register(&mut self, signal: Signal, factory: HandlerFactory) {
        self.handlers.insert(signal, factory);
    }

    /// Whether `signal` has a handler other than the no-op default.
    pub fn handles(&self, signal: Signal) -> bool {
        self.handlers.contains_key(&signal)
    }

    /// The handler for `signal`, falling back to [`NoopSignalHandler`].
    pub fn handler_for(&self, signal: Signal, context: DispatchContext) -> Box<dyn SignalHandler> {
        match self.handlers.get(&signal) {
            Some(factory) => factory(context),
            None => Box::new(NoopSignalHandler),
        }
    }

    /// Look up and run the handler for `signal`.
    pub fn dispatch(&self, signal: Signal, context: DispatchContext) {
        self.handler_for(signal, context).handle_signal();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_context(running: bool) -> (DispatchContext, Interrupt) {
        let interrupt = Interrupt::new();
        let context = DispatchContext {
            pid: 1,
            running,
            interrupt: interrupt.clone(),
        };
        (context, interrupt)
    }

    #[test]
    fn test_standard_table_only_handles_int() {
        let dispatch = SignalDispatch::standard();
        for signal in Signal::ALL {
            assert_eq!(dispatch.handles(signal), signal == Signal::Int, "{signal}");
        }
    }

    #[test]
    fn test_int_while_running_raises() {
        let (context, interrupt) = make_context(true);
        SignalDispatch::global().dispatch(Signal::Int, context);
        assert!(interrupt.is_raised());
    }

    #[test]
    fn test_int_while_not_running_is_noop() {
        let (context, interrupt) = make_context(false);
        SignalDispatch::global().dispatch(Signal::Int, context);
        assert!(!interrupt.is_raised());
    }

    #[test]
    fn test_other_signals_are_noops_while_running() {
        for signal in Signal::ALL.into_iter().filter(|s| *s != Signal::Int) {
            let (context, interrupt) = make_context(true);
            SignalDispatch::global().dispatch(signal, context);
            assert!(!interrupt.is_raised(), "{signal} raised the interrupt");
        }
    }

    #[test]
    fn test_int_handler_captures_running_at_construction() {
        let (context, interrupt) = make_context(false);
        let handler = IntSignalHandler::new(context);
        // The flag is a snapshot; a process that starts later is not affected.
        handler.handle_signal();
        assert!(!interrupt.is_raised());
    }

    #[test]
    fn test_registered_factory_replaces_default() {
        struct RaiseAlways(Interrupt);
        impl SignalHandler for RaiseAlways {
            fn handle_signal(&self) {
                self.0.raise();
            }
        }
        fn quit_handler(context: DispatchContext) -> Box<dyn SignalHandler> {
            Box::new(RaiseAlways(context.interrupt))
        }

        let mut dispatch = SignalDispatch::empty();
        dispatch.register(Signal::Quit, quit_handler);

        let (context, interrupt) = make_context(false);
        dispatch.dispatch(Signal::Quit, context);
        assert!(interrupt.is_raised());

        // Int is not in this table at all.
        let (context, interrupt) = make_context(true);
        dispatch.dispatch(Signal::Int, context);
        assert!(!interrupt.is_raised());
    }
}
