//! # The controller's signal set and the state derived from it.
//!
//! ## State derivation
//! ```text
//! stopped         set ──► Stopped
//! stop_requested  set ──► Stopping
//! failed          set ──► Failed
//! ready           set ──► Running
//! start_requested set ──► Pending
//! otherwise           ──► Idle
//! ```
//! The first matching row wins. Signals only move forward within a run;
//! [`LifecycleSignals::clear_all`] is the only way back to `Idle`.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use super::signal::Signal;

/// Lifecycle state of a controller, derived from its signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    /// Nothing requested since construction or the last reset.
    Idle,
    /// Start requested, service not ready yet.
    Pending,
    /// Service reported readiness.
    Running,
    /// Service reported a start fault; waiting for a stop request.
    Failed,
    /// Stop requested, run not finished yet.
    Stopping,
    /// Run finished (or was stopped before it began).
    Stopped,
}

impl ControllerState {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ControllerState::Idle => "idle",
            ControllerState::Pending => "pending",
            ControllerState::Running => "running",
            ControllerState::Failed => "failed",
            ControllerState::Stopping => "stopping",
            ControllerState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Named signals shared by the controller and every task of a run.
#[derive(Clone, Debug, Default)]
pub struct LifecycleSignals {
    start_requested: Signal,
    ready: Signal,
    stop_requested: Signal,
    stopped: Signal,
    failed: Signal,
    failure: Arc<Mutex<Option<String>>>,
}

impl LifecycleSignals {
    /// Creates a fresh, fully unset signal set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set once a run has been requested (by `start`, or by `stop` before any start).
    pub fn start_requested(&self) -> &Signal {
        &self.start_requested
    }

    /// Set once the service reported readiness.
    pub fn ready(&self) -> &Signal {
        &self.ready
    }

    /// Set once a stop has been requested.
    pub fn stop_requested(&self) -> &Signal {
        &self.stop_requested
    }

    /// Set once the run has fully terminated.
    pub fn stopped(&self) -> &Signal {
        &self.stopped
    }

    /// Set once the service reported a start fault.
    pub fn failed(&self) -> &Signal {
        &self.failed
    }

    /// Records a start fault and raises [`failed`](Self::failed).
    ///
    /// The message is stored before the signal is raised, so a woken waiter always finds it.
    pub fn fail(&self, error: impl Into<String>) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(error.into());
        self.failed.set();
    }

    /// Returns the recorded start fault, if any.
    pub fn failure(&self) -> Option<String> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Derives the current [`ControllerState`].
    pub fn state(&self) -> ControllerState {
        if self.stopped.is_set() {
            ControllerState::Stopped
        } else if self.stop_requested.is_set() {
            ControllerState::Stopping
        } else if self.failed.is_set() {
            ControllerState::Failed
        } else if self.ready.is_set() {
            ControllerState::Running
        } else if self.start_requested.is_set() {
            ControllerState::Pending
        } else {
            ControllerState::Idle
        }
    }

    /// Clears every signal and the recorded failure.
    ///
    /// Only valid while no run is active.
    pub fn clear_all(&self) {
        self.start_requested.clear();
        self.ready.clear();
        self.stop_requested.clear();
        self.stopped.clear();
        self.failed.clear();
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_follows_forward_transitions() {
        let s = LifecycleSignals::new();
        assert_eq!(s.state(), ControllerState::Idle);

        s.start_requested().set();
        assert_eq!(s.state(), ControllerState::Pending);

        s.ready().set();
        assert_eq!(s.state(), ControllerState::Running);

        s.stop_requested().set();
        assert_eq!(s.state(), ControllerState::Stopping);

        s.stopped().set();
        assert_eq!(s.state(), ControllerState::Stopped);
    }

    #[test]
    fn test_failure_is_recorded_before_signal() {
        let s = LifecycleSignals::new();
        s.start_requested().set();
        s.fail("bind: address in use");

        assert!(s.failed().is_set());
        assert_eq!(s.failure().as_deref(), Some("bind: address in use"));
        assert_eq!(s.state(), ControllerState::Failed);
    }

    #[test]
    fn test_clear_all_returns_to_idle() {
        let s = LifecycleSignals::new();
        s.start_requested().set();
        s.fail("boom");
        s.stop_requested().set();
        s.stopped().set();

        s.clear_all();
        assert_eq!(s.state(), ControllerState::Idle);
        assert_eq!(s.failure(), None);
        assert!(!s.failed().is_set());
    }

    #[test]
    fn test_clones_share_signals() {
        let a = LifecycleSignals::new();
        let b = a.clone();
        a.ready().set();
        assert!(b.ready().is_set());
    }
}
