use std::sync::Arc;

use tokio::runtime::Handle;

use crate::{
    config::Config,
    service::{ElapsedProfiler, ProfilerRef, ServiceRef},
};

use super::controller::LifecycleController;

/// Builder for constructing a [`LifecycleController`] with optional features.
pub struct ControllerBuilder {
    cfg: Config,
    service: ServiceRef,
    profiler: Option<ProfilerRef>,
    runtime: Option<Handle>,
}

impl ControllerBuilder {
    /// Creates a new builder for `service` with the default configuration.
    pub fn new(service: ServiceRef) -> Self {
        Self {
            cfg: Config::default(),
            service,
            profiler: None,
            runtime: None,
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the profiler used when [`Config::profiling`] is enabled.
    ///
    /// Without one, an [`ElapsedProfiler`] is used.
    pub fn with_profiler(mut self, profiler: ProfilerRef) -> Self {
        self.profiler = Some(profiler);
        self
    }

    /// Binds run tasks to `runtime` instead of the caller's runtime.
    ///
    /// Needed when the controller is shared by callers living on different runtimes
    /// (for example one `#[tokio::test]` runtime per test): the run must outlive each of them.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Builds the controller. Nothing is spawned until the first `start` or `stop`.
    pub fn build(self) -> Arc<LifecycleController> {
        let profiler = if self.cfg.profiling {
            Some(
                self.profiler
                    .unwrap_or_else(|| Arc::new(ElapsedProfiler::new()) as ProfilerRef),
            )
        } else {
            None
        };

        Arc::new(LifecycleController::new_internal(
            self.cfg,
            self.service,
            profiler,
            self.runtime,
        ))
    }
}
