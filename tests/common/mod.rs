#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use runvisor::{Event, EventKind, Profiler, ServiceAdapter, ServiceError, Signal};
use tokio::sync::broadcast;

/// Counting stand-in for a real service.
#[derive(Default)]
pub struct FakeService {
    pub prepares: AtomicUsize,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    /// `None` = never becomes ready.
    pub ready_after: Option<Duration>,
    pub fail_start: bool,
    pub fail_stop: bool,
}

impl FakeService {
    pub fn ready_after(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            ready_after: Some(delay),
            ..Self::default()
        })
    }

    pub fn instant() -> Arc<Self> {
        Self::ready_after(Duration::ZERO)
    }

    pub fn never_ready() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_start() -> Arc<Self> {
        Arc::new(Self {
            fail_start: true,
            ..Self::default()
        })
    }

    pub fn failing_stop() -> Arc<Self> {
        Arc::new(Self {
            ready_after: Some(Duration::ZERO),
            fail_stop: true,
            ..Self::default()
        })
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServiceAdapter for FakeService {
    fn name(&self) -> &str {
        "fake"
    }

    async fn prepare(&self) -> Result<(), ServiceError> {
        self.prepares.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn run_async(&self, on_ready: Signal) -> Result<(), ServiceError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(ServiceError::Start {
                error: "address in use".into(),
            });
        }
        if let Some(delay) = self.ready_after {
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                on_ready.set();
            });
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), ServiceError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop {
            return Err(ServiceError::Stop {
                error: "still busy".into(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingProfiler {
    pub begins: AtomicUsize,
    pub ends: AtomicUsize,
}

#[async_trait]
impl Profiler for CountingProfiler {
    fn name(&self) -> &str {
        "counting"
    }

    async fn begin(&self) {
        self.begins.fetch_add(1, Ordering::SeqCst);
    }

    async fn end(&self) {
        self.ends.fetch_add(1, Ordering::SeqCst);
    }
}

/// Everything published so far, in order.
pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<EventKind> {
    let mut kinds = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        kinds.push(ev.kind);
    }
    kinds
}

pub const LONG: Duration = Duration::from_secs(5);
