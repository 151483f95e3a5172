//! # Lifecycle events emitted by the controller and the tasks of a run.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Request events**: caller intent (start/stop requested, reset completed)
//! - **Run events**: progress of one run (starting, ready, stopping, stopped)
//! - **Fault events**: collaborator faults (start/stop failed)
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use runvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::StartFailed)
//!     .with_run(3)
//!     .with_service("emulator")
//!     .with_reason("bind: address in use");
//!
//! assert_eq!(ev.kind, EventKind::StartFailed);
//! assert_eq!(ev.run, Some(3));
//! assert_eq!(ev.reason.as_deref(), Some("bind: address in use"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Request events ===
    /// A start was requested and a new run was spawned.
    ///
    /// Sets:
    /// - `run`: run generation
    /// - `service`: service name
    StartRequested,

    /// A stop was requested (published on every `stop()` call).
    ///
    /// Sets:
    /// - `service`: service name
    StopRequested,

    /// `reset()` cleared every signal; the controller is idle again.
    ///
    /// Sets:
    /// - `service`: service name
    ResetCompleted,

    // === Run events ===
    /// The run is invoking the service.
    ///
    /// Sets:
    /// - `run`, `service`
    ServiceStarting,

    /// The service reported readiness.
    ///
    /// Sets:
    /// - `run`, `service`
    Ready,

    /// The watchdog is stopping the service.
    ///
    /// Sets:
    /// - `run`, `service`
    ServiceStopping,

    /// The run terminated (always the last event of a run).
    ///
    /// Sets:
    /// - `run`, `service`
    /// - `reason`: `"stopped before start"` on the early-stop path
    Stopped,

    /// A profiling session began.
    ///
    /// Sets:
    /// - `run`, `service` (profiler name in `reason`)
    ProfilingStarted,

    /// A profiling session ended.
    ///
    /// Sets:
    /// - `run`, `service` (profiler name in `reason`)
    ProfilingFinished,

    // === Fault events ===
    /// The service failed before becoming ready.
    ///
    /// Sets:
    /// - `run`, `service`
    /// - `reason`: fault message
    StartFailed,

    /// The service failed to stop.
    ///
    /// Sets:
    /// - `run`, `service`
    /// - `reason`: fault message
    StopFailed,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Run generation (1-based, per controller).
    pub run: Option<u64>,
    /// Name of the managed service.
    pub service: Option<Arc<str>>,
    /// Human-readable reason (fault details, early-stop marker, profiler name).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            run: None,
            service: None,
            reason: None,
        }
    }

    /// Attaches the run generation.
    #[inline]
    pub fn with_run(mut self, run: u64) -> Self {
        self.run = Some(run);
        self
    }

    /// Attaches the service name.
    #[inline]
    pub fn with_service(mut self, service: impl Into<Arc<str>>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
