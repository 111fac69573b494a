//! Custom assertion helpers.

use pl_core::connection::{same_handler, BufferConnection, Connection, InputConsumer, SignalConsumer};
use pl_core::state::Process;
use pl_protocol::{CommandResult, ProcessStatus};

/// Assert that the process terminated with `result`.
pub fn assert_terminated_with(process: &Process, result: CommandResult) {
    assert_eq!(process.status(), ProcessStatus::Terminated);
    assert!(!process.is_running());
    assert_eq!(process.result(), Some(result));
}

/// Assert that the connection's handler slots hold exactly these instances.
pub fn assert_handlers(
    connection: &BufferConnection,
    signal: &Option<SignalConsumer>,
    stdin: &Option<InputConsumer>,
) {
    assert!(
        same_handler(&connection.signal_handler(), signal),
        "signal handler was not restored"
    );
    assert!(
        same_handler(&connection.stdin_handler(), stdin),
        "stdin handler was not restored"
    );
}
