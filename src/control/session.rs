//! # RunSession: one complete attempt to bring the service up, keep it running, and tear it down.
//!
//! ## Steps
//! ```text
//! 1. service.prepare()                       (env/config side effects)
//! 2. spawn Watchdog                          (waits for stop_requested)
//! 3. spawn profiling (if enabled)            (active until the run ends)
//! 4. service.run_async(on_ready)
//! 5. wait on_ready   ── or watchdog done ──► skip to 8
//! 6. set ready, publish Ready
//! 7. wait for the watchdog to finish
//! 8. set stopped, publish Stopped            (always, via StoppedGuard)
//! ```
//!
//! ## Fault paths
//! - `prepare()` fails → `fail()` is recorded, the run ends immediately (nothing to stop)
//! - `run_async()` fails → `fail()` is recorded, the run still waits for the watchdog so
//!   the service gets its `stop()` call during teardown
//! - `stop()` fails → the fault is returned from [`RunSession::run`]
//! - panic anywhere → the guard still sets `stopped` and cancels the run token

use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    control::{context::RunContext, watchdog::Watchdog},
    error::ServiceError,
    events::EventKind,
    service::ProfilerRef,
    signals::Signal,
};

/// Marks the run as finished when dropped, on every exit path.
struct StoppedGuard {
    ctx: RunContext,
    token: CancellationToken,
}

impl StoppedGuard {
    fn new(ctx: RunContext) -> Self {
        Self {
            ctx,
            token: CancellationToken::new(),
        }
    }

    fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for StoppedGuard {
    fn drop(&mut self) {
        self.token.cancel();
        self.ctx.signals.stopped().set();
        self.ctx.finished.set();
        self.ctx.publish(EventKind::Stopped);
        info!(run = self.ctx.run, service = self.ctx.service_name(), "run finished");
    }
}

pub(crate) struct RunSession {
    ctx: RunContext,
    profiler: Option<ProfilerRef>,
    profiling: Option<JoinHandle<()>>,
}

impl RunSession {
    pub fn new(ctx: RunContext, profiler: Option<ProfilerRef>) -> Self {
        Self {
            ctx,
            profiler,
            profiling: None,
        }
    }

    /// Drives the run to completion. `stopped` is set before this returns.
    pub async fn run(mut self) -> Result<(), ServiceError> {
        let guard = StoppedGuard::new(self.ctx.clone());
        let res = self.drive(guard.token()).await;
        drop(guard);

        if let Some(profiling) = self.profiling.take() {
            if let Err(e) = profiling.await {
                warn!(run = self.ctx.run, error = %e, "profiling session aborted");
            }
        }
        res
    }

    async fn drive(&mut self, token: &CancellationToken) -> Result<(), ServiceError> {
        let ctx = self.ctx.clone();

        debug!(run = ctx.run, service = ctx.service_name(), "applying service configuration");
        ctx.service
            .prepare()
            .await
            .inspect_err(|e| self.report_start_fault(e))?;

        let mut watchdog = Watchdog::new(ctx.clone()).spawn(token.clone());
        self.profiling = self.spawn_profiling(token);

        info!(run = ctx.run, service = ctx.service_name(), "starting service");
        ctx.publish(EventKind::ServiceStarting);

        let on_ready = Signal::new();
        if let Err(e) = ctx.service.run_async(on_ready.clone()).await {
            self.report_start_fault(&e);
            watchdog_outcome(watchdog.await)?;
            return Err(e);
        }

        debug!(run = ctx.run, "waiting for service to become ready");
        tokio::select! {
            biased;
            _ = on_ready.wait() => {}
            res = &mut watchdog => {
                info!(run = ctx.run, "stopped before the service became ready");
                return watchdog_outcome(res);
            }
        }

        ctx.signals.ready().set();
        ctx.publish(EventKind::Ready);
        info!(run = ctx.run, service = ctx.service_name(), "service ready");

        debug!(run = ctx.run, "waiting for watchdog to join");
        watchdog_outcome(watchdog.await)
    }

    fn report_start_fault(&self, e: &ServiceError) {
        warn!(
            run = self.ctx.run,
            error = %e.as_message(),
            label = e.as_label(),
            "service failed to start"
        );
        self.ctx.signals.fail(e.to_string());
        self.ctx
            .bus
            .publish(self.ctx.event(EventKind::StartFailed).with_reason(e.to_string()));
    }

    /// Spawns the profiling session; it ends when the run token is cancelled.
    fn spawn_profiling(&self, token: &CancellationToken) -> Option<JoinHandle<()>> {
        let profiler = self.profiler.clone()?;
        let ctx = self.ctx.clone();
        let token = token.clone();

        Some(tokio::spawn(async move {
            profiler.begin().await;
            ctx.bus.publish(
                ctx.event(EventKind::ProfilingStarted)
                    .with_reason(profiler.name()),
            );

            token.cancelled().await;

            profiler.end().await;
            ctx.bus.publish(
                ctx.event(EventKind::ProfilingFinished)
                    .with_reason(profiler.name()),
            );
        }))
    }
}

fn watchdog_outcome(res: Result<Result<(), ServiceError>, JoinError>) -> Result<(), ServiceError> {
    match res {
        Ok(outcome) => outcome,
        Err(e) => Err(ServiceError::Stop {
            error: format!("watchdog aborted: {e}"),
        }),
    }
}
