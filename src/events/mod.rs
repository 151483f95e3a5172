//! Lifecycle events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `LifecycleController` (requests, reset), `StartupMonitor`
//!   (early stop), `RunSession` (starting/ready/stopped, profiling), `Watchdog` (stopping).
//! - **Consumers**: whoever calls `LifecycleController::subscribe()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
