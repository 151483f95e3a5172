//! # Watchdog: turns a stop request into a service stop call.
//!
//! ```text
//! select! {
//!   stop_requested ──► publish ServiceStopping ──► service.stop() ──► exit
//!   run token      ──► exit (run ended without a stop request)
//! }
//! ```
//!
//! ## Rules
//! - `stop()` is called **at most once** per run, however many times stop was requested
//! - no retries: a failed stop is returned to the run and published as `StopFailed`

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{control::context::RunContext, error::ServiceError, events::EventKind};

pub(crate) struct Watchdog {
    ctx: RunContext,
}

impl Watchdog {
    pub fn new(ctx: RunContext) -> Self {
        Self { ctx }
    }

    /// Spawns the watchdog; the handle completes once the service was stopped.
    pub fn spawn(self, token: CancellationToken) -> JoinHandle<Result<(), ServiceError>> {
        tokio::spawn(self.run(token))
    }

    async fn run(self, token: CancellationToken) -> Result<(), ServiceError> {
        let ctx = &self.ctx;
        debug!(run = ctx.run, service = ctx.service_name(), "waiting for stop request");

        tokio::select! {
            biased;
            _ = ctx.signals.stop_requested().wait() => {}
            _ = token.cancelled() => {
                debug!(run = ctx.run, "run ended before a stop request");
                return Ok(());
            }
        }

        info!(run = ctx.run, service = ctx.service_name(), "stopping service");
        ctx.publish(EventKind::ServiceStopping);

        match ctx.service.stop().await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(
                    run = ctx.run,
                    error = %e.as_message(),
                    label = e.as_label(),
                    "service stop failed"
                );
                ctx.bus
                    .publish(ctx.event(EventKind::StopFailed).with_reason(e.to_string()));
                Err(e)
            }
        }
    }
}
