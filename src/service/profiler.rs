//! # Profiling hook active for the duration of a run.
//!
//! A [`Profiler`] is bracketed around a run when [`Config::profiling`](crate::Config::profiling)
//! is enabled: `begin()` right after the watchdog is armed, `end()` once the run is over.
//!
//! [`ElapsedProfiler`] is the built-in implementation: it measures wall time and logs it.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::info;

/// Shared handle to a profiler.
pub type ProfilerRef = Arc<dyn Profiler>;

/// # Run-scoped profiling session.
#[async_trait]
pub trait Profiler: Send + Sync + 'static {
    /// Returns a stable, human-readable profiler name.
    fn name(&self) -> &str;

    /// Called when the run starts.
    async fn begin(&self);

    /// Called once the run has ended.
    async fn end(&self);
}

#[derive(Debug, Default)]
struct Timing {
    started: Option<Instant>,
    last: Option<Duration>,
}

/// Measures how long each run lasted.
#[derive(Debug, Default)]
pub struct ElapsedProfiler {
    timing: Mutex<Timing>,
}

impl ElapsedProfiler {
    /// Creates a profiler with no recorded sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Duration of the last completed session.
    pub fn last_elapsed(&self) -> Option<Duration> {
        self.timing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last
    }
}

#[async_trait]
impl Profiler for ElapsedProfiler {
    fn name(&self) -> &str {
        "elapsed"
    }

    async fn begin(&self) {
        let mut timing = self.timing.lock().unwrap_or_else(PoisonError::into_inner);
        timing.started = Some(Instant::now());
        info!("start profiling");
    }

    async fn end(&self) {
        let mut timing = self.timing.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(started) = timing.started.take() {
            let elapsed = started.elapsed();
            timing.last = Some(elapsed);
            info!(elapsed = ?elapsed, "done profiling");
        }
    }
}
