//! Cooperative cancellation token.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::error::CommandError;

/// A one-way flag raised when a running command should stop.
///
/// Raising never blocks beyond a short critical section, so it is safe to
/// call from a signal delivery context. Commands observe the flag at their
/// own checkpoints: [`Interrupt::check`] between units of work, or
/// [`Interrupt::sleep`] in place of a blocking wait.
#[derive(Clone, Default)]
pub struct Interrupt {
    state: Arc<InterruptState>,
}

#[derive(Default)]
struct InterruptState {
    raised: Mutex<bool>,
    cond: Condvar,
}

impl Interrupt {
    /// Create a token that has not been raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the interrupt and wake every waiter.
    pub fn raise(&self) {
        let mut raised = self.state.raised.lock();
        *raised = true;
        self.state.cond.notify_all();
    }

    /// Whether the interrupt has been raised.
    pub fn is_raised(&self) -> bool {
        *self.state.raised.lock()
    }

    /// Return [`CommandError::Interrupted`] if the interrupt has been raised.
    pub fn check(&self) -> Result<(), CommandError> {
        if self.is_raised() {
            Err(CommandError::Interrupted)
        } else {
            Ok(())
        }
    }

    /// Block for up to `timeout` or until the interrupt is raised.
    ///
    /// Returns `true` if the interrupt was raised.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut raised = self.state.raised.lock();
        match Instant::now().checked_add(timeout) {
            Some(deadline) => {
                while !*raised {
                    if self.state.cond.wait_until(&mut raised, deadline).timed_out() {
                        break;
                    }
                }
            }
            None => {
                while !*raised {
                    self.state.cond.wait(&mut raised);
                }
            }
        }
        *raised
    }

    /// Sleep for `duration`, returning early with
    /// [`CommandError::Interrupted`] if the interrupt is raised.
    pub fn sleep(&self, duration: Duration) -> Result<(), CommandError> {
        if self.wait_timeout(duration) {
            Err(CommandError::Interrupted)
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interrupt")
            .field("raised", &self.is_raised())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_new_token_is_clear() {
        let interrupt = Interrupt::new();
        assert!(!interrupt.is_raised());
        assert!(interrupt.check().is_ok());
    }

    #[test]
    fn test_raise_is_visible_through_clones() {
        let interrupt = Interrupt::new();
        let clone = interrupt.clone();
        clone.raise();

        assert!(interrupt.is_raised());
        assert!(matches!(interrupt.check(), Err(CommandError::Interrupted)));
    }

    #[test]
    fn test_sleep_elapses_without_raise() {
        let interrupt = Interrupt::new();
        assert!(interrupt.sleep(Duration::from_millis(10)).is_ok());
    }

    #[test]
    fn test_sleep_wakes_on_raise() {
        let interrupt = Interrupt::new();
        let raiser = interrupt.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            raiser.raise();
        });

        let started = Instant::now();
        let result = interrupt.sleep(Duration::from_secs(30));
        handle.join().unwrap();

        assert!(matches!(result, Err(CommandError::Interrupted)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_unbounded_wait_returns_when_already_raised() {
        let interrupt = Interrupt::new();
        interrupt.raise();
        assert!(interrupt.wait_timeout(Duration::MAX));
    }
}
