use tracing::info;

use crate::{
    events::{Bus, Event, EventKind},
    service::ServiceRef,
    signals::{LifecycleSignals, Signal},
};

/// Everything a task of one run needs: identity, collaborator, signals and bus.
#[derive(Clone)]
pub(crate) struct RunContext {
    /// Run generation (1-based, per controller).
    pub run: u64,
    /// Managed service.
    pub service: ServiceRef,
    /// Controller signals (shared with the controller).
    pub signals: LifecycleSignals,
    /// Lifecycle event bus.
    pub bus: Bus,
    /// Set once this run is over. Never cleared: a reset starts the next run with a fresh one.
    pub finished: Signal,
}

impl RunContext {
    #[inline]
    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Builds an event tagged with this run and service.
    pub fn event(&self, kind: EventKind) -> Event {
        Event::new(kind)
            .with_run(self.run)
            .with_service(self.service.name())
    }

    /// Publishes an event tagged with this run and service.
    pub fn publish(&self, kind: EventKind) {
        self.bus.publish(self.event(kind));
    }

    /// Ends a run that never reached the service.
    pub fn finish_early(&self, reason: &str) {
        info!(run = self.run, reason, "run ended before the service was started");
        self.signals.stopped().set();
        self.finished.set();
        self.bus.publish(self.event(EventKind::Stopped).with_reason(reason));
    }
}
