//! # StartupMonitor: the task owned by a controller's run handle.
//!
//! ```text
//! WAITING: wait start_requested
//!    ├─ stop_requested already set ──► set stopped, publish Stopped("stopped before start") ──► DONE
//!    └─ otherwise ──► RunSession::run() ──► DONE
//! ```
//!
//! The early-stop branch never contacts the service: a `stop()` issued before any `start()`
//! still ends with `stopped` set, so `join()` cannot hang on it.

use tracing::{error, info};

use crate::{
    control::{context::RunContext, session::RunSession},
    service::ProfilerRef,
};

/// Reason attached to the `Stopped` event of the early-stop branch.
pub(crate) const STOPPED_BEFORE_START: &str = "stopped before start";

pub(crate) struct StartupMonitor {
    ctx: RunContext,
    profiler: Option<ProfilerRef>,
}

impl StartupMonitor {
    pub fn new(ctx: RunContext, profiler: Option<ProfilerRef>) -> Self {
        Self { ctx, profiler }
    }

    pub async fn run(self) {
        let ctx = &self.ctx;
        info!(run = ctx.run, "waiting on start signal");
        ctx.signals.start_requested().wait().await;

        if ctx.signals.stop_requested().is_set() {
            ctx.finish_early(STOPPED_BEFORE_START);
            return;
        }

        info!(run = ctx.run, service = ctx.service_name(), "running service");
        let session = RunSession::new(ctx.clone(), self.profiler.clone());
        if let Err(e) = session.run().await {
            error!(
                run = ctx.run,
                service = ctx.service_name(),
                error = %e.as_message(),
                label = e.as_label(),
                "run ended with a service fault"
            );
        }
    }
}
