//! # LifecycleController: start-once, stop-safe coordination of one shared service.
//!
//! The controller owns the [`LifecycleSignals`], the event [`Bus`], and the run slot
//! (handle of the active startup monitor). Every run is:
//!
//! ```text
//! start() ─┐                     ┌─► RunSession ──► Watchdog ──► service.stop()
//! stop()  ─┼─► decision lock ────┤      │
//!          │   (spawn at most    │      └─► service.run_async(on_ready) ──► ready
//!          │    one monitor)     │
//!          └─────────────────────┴─► StartupMonitor (early stop? ──► stopped)
//!
//! join()  ── wait start_requested ──► await monitor handle ──► wait run finished
//! reset() ── (one at a time) stop() ──► join() ──► clear slot + signals (under the decision lock)
//! ```
//!
//! ## Rules
//! - **One run at a time**: the decision lock makes the "is a run already requested?"
//!   check and the spawn atomic; it is never held across an `.await`.
//! - **Early stop**: `stop()` before any `start()` spawns a monitor that ends without ever
//!   contacting the service, so `join()` returns and the state is `Stopped`.
//! - **Monotonic signals**: only `reset()` moves signals backwards, after `join()` completed.
//!   Each run also carries its own `finished` signal that is never cleared, so a `join()`
//!   racing a `reset()` still observes the end of the run it joined.
//! - **Bounded waits**: only `start`/`wait_ready` and `join` accept a timeout.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use runvisor::{LifecycleController, ServiceAdapter, ServiceError, Signal};
//!
//! struct Emulator;
//!
//! #[async_trait]
//! impl ServiceAdapter for Emulator {
//!     fn name(&self) -> &str { "emulator" }
//!     async fn run_async(&self, on_ready: Signal) -> Result<(), ServiceError> {
//!         on_ready.set();
//!         Ok(())
//!     }
//!     async fn stop(&self) -> Result<(), ServiceError> { Ok(()) }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let ctl = LifecycleController::new(Arc::new(Emulator));
//!     assert!(ctl.start(true, Some(Duration::from_secs(5))).await);
//!     ctl.reset().await;
//! }
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use tokio::{
    runtime::Handle,
    sync::{Mutex as AsyncMutex, broadcast},
    time,
};
use tracing::{debug, error, info, warn};

use crate::{
    config::Config,
    control::{
        builder::ControllerBuilder,
        context::RunContext,
        monitor::{STOPPED_BEFORE_START, StartupMonitor},
        slot::RunSlot,
    },
    error::StartError,
    events::{Bus, Event, EventKind},
    service::{ProfilerRef, ServiceRef},
    signals::{ControllerState, LifecycleSignals, Signal},
};

/// Failure recorded when a start is requested where no run can be spawned.
const NO_RUNTIME: &str = "no tokio runtime available to run the service";

/// Coordinates start, stop, join and reset of a single shared service instance.
pub struct LifecycleController {
    cfg: Config,
    service: ServiceRef,
    profiler: Option<ProfilerRef>,
    runtime: Option<Handle>,
    signals: LifecycleSignals,
    bus: Bus,
    slot: Mutex<RunSlot>,
    resets: AsyncMutex<()>,
}

impl LifecycleController {
    /// Returns a builder for a controller managing `service`.
    pub fn builder(service: ServiceRef) -> ControllerBuilder {
        ControllerBuilder::new(service)
    }

    /// Creates a controller with the default [`Config`].
    pub fn new(service: ServiceRef) -> Arc<Self> {
        Self::builder(service).build()
    }

    pub(crate) fn new_internal(
        cfg: Config,
        service: ServiceRef,
        profiler: Option<ProfilerRef>,
        runtime: Option<Handle>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            cfg,
            service,
            profiler,
            runtime,
            signals: LifecycleSignals::new(),
            bus,
            slot: Mutex::new(RunSlot::default()),
            resets: AsyncMutex::new(()),
        }
    }

    /// Requests a run and optionally waits for readiness.
    ///
    /// Only the first caller (since construction or the last reset) spawns a run; every other
    /// caller shares it. With `wait = true` this waits up to `timeout` (`None` = forever).
    ///
    /// Returns whether readiness was observed. `false` is not fatal: the run may still
    /// become ready later.
    pub async fn start(&self, wait: bool, timeout: Option<Duration>) -> bool {
        self.request_run();
        if !wait {
            return self.signals.ready().is_set();
        }

        match self.wait_ready(timeout).await {
            Ok(()) => true,
            Err(e) if e.is_transient() => {
                debug!(
                    error = %e.as_message(),
                    label = e.as_label(),
                    "start did not observe readiness yet"
                );
                false
            }
            Err(e) => {
                warn!(
                    error = %e.as_message(),
                    label = e.as_label(),
                    "start did not observe readiness"
                );
                false
            }
        }
    }

    /// Waits for readiness, distinguishing why it was not observed.
    ///
    /// - [`StartError::Timeout`] the run may still become ready
    /// - [`StartError::Failed`] the service reported a start fault
    /// - [`StartError::Stopped`] the run ended (or was stopped before it began)
    pub async fn wait_ready(&self, timeout: Option<Duration>) -> Result<(), StartError> {
        let outcome = async {
            tokio::select! {
                biased;
                _ = self.signals.ready().wait() => Ok(()),
                _ = self.signals.failed().wait() => Err(StartError::Failed {
                    error: self.signals.failure().unwrap_or_default(),
                }),
                _ = self.signals.stopped().wait() => Err(StartError::Stopped),
            }
        };

        match timeout {
            None => outcome.await,
            Some(dur) => time::timeout(dur, outcome)
                .await
                .unwrap_or(Err(StartError::Timeout { timeout: dur })),
        }
    }

    /// Requests the service to stop. Never waits.
    ///
    /// If no run was requested yet, a startup monitor is spawned anyway so that it can
    /// observe the early stop and mark the controller stopped. Outside of any tokio runtime
    /// (and without [`ControllerBuilder::with_runtime`]) the early stop is completed inline.
    pub fn stop(&self) {
        if self.signals.stop_requested().set() {
            info!(service = self.service.name(), "stop requested");
        }
        self.bus
            .publish(Event::new(EventKind::StopRequested).with_service(self.service.name()));
        self.request_run();
    }

    /// Waits for the current run to finish. Does not request a stop.
    ///
    /// If nothing was requested yet, first waits (without bound) until a run is requested.
    /// `timeout` bounds the rest of the wait; returns whether the run finished in time.
    pub async fn join(&self, timeout: Option<Duration>) -> bool {
        self.signals.start_requested().wait().await;
        let deadline = timeout.map(|d| time::Instant::now() + d);

        let (handle, generation, finished) = {
            let mut slot = self.lock_slot();
            (slot.handle.take(), slot.generation, slot.finished.clone())
        };

        if let Some(mut handle) = handle {
            let joined = match deadline {
                None => Some((&mut handle).await),
                Some(at) => time::timeout_at(at, &mut handle).await.ok(),
            };

            match joined {
                Some(Ok(())) => {}
                Some(Err(e)) => {
                    warn!(run = generation, error = %e, "startup monitor did not complete cleanly");
                    self.signals.stopped().set();
                    finished.set();
                }
                None => {
                    let mut slot = self.lock_slot();
                    if slot.handle.is_none() && slot.generation == generation {
                        slot.handle = Some(handle);
                    }
                    debug!(run = generation, "join timed out while the run is still active");
                    return false;
                }
            }
        }

        match deadline {
            None => {
                finished.wait().await;
                true
            }
            Some(at) => time::timeout_at(at, finished.wait()).await.is_ok() || finished.is_set(),
        }
    }

    /// Stops and joins the current run, then returns the controller to [`ControllerState::Idle`].
    ///
    /// Safe to call when `start` was never called. Concurrent resets run one after another.
    pub async fn reset(&self) {
        let _serial = self.resets.lock().await;

        self.stop();
        self.join(None).await;

        {
            let mut slot = self.lock_slot();
            slot.handle = None;
            self.signals.clear_all();
        }

        info!(service = self.service.name(), "controller reset");
        self.bus
            .publish(Event::new(EventKind::ResetCompleted).with_service(self.service.name()));
    }

    /// Runs `f` against a ready service and always resets afterwards.
    ///
    /// Waits for readiness up to [`Config::startup_timeout`]; on failure the controller is
    /// reset and the [`StartError`] returned without calling `f`. A panic inside `f` is
    /// resumed after the reset.
    pub async fn scoped<F, Fut, T>(&self, f: F) -> Result<T, StartError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.start(false, None).await;
        if let Err(e) = self.wait_ready(self.cfg.startup_timeout()).await {
            error!(
                service = self.service.name(),
                error = %e.as_message(),
                label = e.as_label(),
                "service did not start in time"
            );
            self.reset().await;
            return Err(e);
        }

        let outcome = AssertUnwindSafe(f()).catch_unwind().await;
        self.reset().await;

        match outcome {
            Ok(value) => Ok(value),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ControllerState {
        self.signals.state()
    }

    /// Signals shared with the tasks of the current run.
    pub fn signals(&self) -> &LifecycleSignals {
        &self.signals
    }

    /// Configuration this controller was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Subscribes to lifecycle events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Spawns a startup monitor unless a run was already requested.
    ///
    /// Returns whether this call requested the run.
    fn request_run(&self) -> bool {
        let mut slot = self.lock_slot();
        if self.signals.start_requested().is_set() {
            return false;
        }

        slot.generation += 1;
        slot.finished = Signal::new();
        let ctx = RunContext {
            run: slot.generation,
            service: Arc::clone(&self.service),
            signals: self.signals.clone(),
            bus: self.bus.clone(),
            finished: slot.finished.clone(),
        };

        info!(run = ctx.run, service = ctx.service_name(), "start requested");
        self.bus.publish(ctx.event(EventKind::StartRequested));

        match self.runtime.clone().or_else(|| Handle::try_current().ok()) {
            Some(rt) => {
                let monitor = StartupMonitor::new(ctx, self.profiler.clone());
                slot.handle = Some(rt.spawn(monitor.run()));
                self.signals.start_requested().set();
            }
            None => {
                self.signals.start_requested().set();
                if self.signals.stop_requested().is_set() {
                    ctx.finish_early(STOPPED_BEFORE_START);
                } else {
                    error!(run = ctx.run, service = ctx.service_name(), "{NO_RUNTIME}");
                    self.signals.fail(NO_RUNTIME);
                    ctx.bus
                        .publish(ctx.event(EventKind::StartFailed).with_reason(NO_RUNTIME));
                    ctx.finish_early(NO_RUNTIME);
                }
            }
        }
        true
    }

    fn lock_slot(&self) -> MutexGuard<'_, RunSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
