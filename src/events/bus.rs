//! # Lifecycle event fan-out.
//!
//! [`Bus`] hands every lifecycle [`Event`] to the receivers returned by
//! [`LifecycleController::subscribe`](crate::LifecycleController::subscribe).
//!
//! ```text
//! LifecycleController ─┐
//! StartupMonitor      ─┤
//! RunSession          ─┼──► Bus ──► subscriber 1..n
//! Watchdog            ─┤
//! Profiling task      ─┘
//! ```
//!
//! Publishing never waits. A receiver that falls more than `capacity` events behind gets
//! `RecvError::Lagged(n)` and resumes after the `n` oldest events. Events published while
//! nobody is subscribed are only traced.

use tokio::sync::broadcast;
use tracing::trace;

use super::event::Event;

/// Lifecycle event channel shared by a controller and its runs.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus buffering up to `capacity` events per receiver (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes `ev` and returns how many receivers it was queued for.
    pub fn publish(&self, ev: Event) -> usize {
        trace!(seq = ev.seq, kind = ?ev.kind, run = ?ev.run, "lifecycle event");
        self.tx.send(ev).unwrap_or(0)
    }

    /// Returns a receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
