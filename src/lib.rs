//! # runvisor
//!
//! **Runvisor** coordinates the lifecycle of one long-running background service
//! shared by many independent callers (typically test cases).
//!
//! It guarantees that:
//! - the service is started **at most once**, however many callers request it concurrently;
//! - callers can wait (bounded) until the service is actually **ready**;
//! - a stop issued **before** anything was started does not deadlock;
//! - after a full stop the controller can be **reset** and started again.
//!
//! What the service does is not runvisor's business: it is reached only through
//! [`ServiceAdapter`] (`run_async` + `stop`) and a readiness [`Signal`].
//!
//! ## Architecture
//! ```text
//!   caller A ─┐          caller B ─┐          caller C ─┐
//!     start() │            start() │             stop() │
//!             ▼                    ▼                    ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  LifecycleController                                              │
//! │  - decision lock + RunSlot (handle of the active monitor)         │
//! │  - LifecycleSignals (start_requested/ready/stop_requested/stopped)│
//! │  - Bus (lifecycle events)                                         │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        ▼ (first request only)
//! ┌──────────────┐  early stop   ┌─────────┐
//! │StartupMonitor│ ────────────► │ stopped │
//! └──────┬───────┘               └─────────┘
//!        ▼
//! ┌──────────────┐ spawns ┌──────────┐ stop_requested ┌──────────────────┐
//! │  RunSession  │ ─────► │ Watchdog │ ─────────────► │ service.stop()   │
//! │              │ ─────► │ Profiler │ (if enabled, until the run ends)  │
//! │              │ ──────────────────────────────────►│ service.run_async│
//! └──────┬───────┘                                    └────────┬─────────┘
//!        │ ◄──────────────────── on_ready ──────────────────────┘
//!        ├─► set ready
//!        ├─► wait watchdog
//!        └─► set stopped (every exit path)
//! ```
//!
//! ## Lifecycle
//! ```text
//! Idle ──start──► Pending ──ready──► Running ──stop──► Stopping ──► Stopped ──reset──► Idle
//!   └──stop (early)─────────────────────────────────────────────────► Stopped
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types                                   |
//! |-------------------|----------------------------------------------------------|---------------------------------------------|
//! | **Controller**    | start/stop/join/reset, readiness waits, scoped fixtures  | [`LifecycleController`], [`ControllerBuilder`] |
//! | **Collaborators** | The managed service and an optional profiler             | [`ServiceAdapter`], [`Profiler`]            |
//! | **Signals**       | Waitable flags and the state derived from them           | [`Signal`], [`LifecycleSignals`], [`ControllerState`] |
//! | **Events**        | Broadcast lifecycle events                               | [`Event`], [`EventKind`]                    |
//! | **Errors**        | Typed faults and start outcomes                          | [`ServiceError`], [`StartError`]            |
//! | **Configuration** | Profiling, startup timeout, env overrides                | [`Config`]                                  |
//!
//! ## Concurrency boundary
//! Signals are in-process (`tokio::sync::watch`); waits are `async`. Controllers shared
//! across runtimes should be bound to a long-lived one with [`ControllerBuilder::with_runtime`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use runvisor::{ControllerState, LifecycleController, ServiceAdapter, ServiceError, Signal};
//!
//! struct Emulator;
//!
//! #[async_trait]
//! impl ServiceAdapter for Emulator {
//!     fn name(&self) -> &str { "emulator" }
//!     async fn run_async(&self, on_ready: Signal) -> Result<(), ServiceError> {
//!         tokio::spawn(async move { on_ready.set() });
//!         Ok(())
//!     }
//!     async fn stop(&self) -> Result<(), ServiceError> { Ok(()) }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), runvisor::StartError> {
//!     let ctl = LifecycleController::new(Arc::new(Emulator));
//!
//!     let answer = ctl.scoped(|| async {
//!         // talk to the running service...
//!         42
//!     }).await?;
//!
//!     assert_eq!(answer, 42);
//!     assert_eq!(ctl.state(), ControllerState::Idle);
//!     Ok(())
//! }
//! ```
mod config;
mod control;
mod error;
mod events;
mod service;
mod signals;

// ---- Public re-exports ----

pub use config::{Config, ENV_PROFILING, ENV_STARTUP_TIMEOUT_SECS};
pub use control::{ControllerBuilder, LifecycleController};
pub use error::{ConfigError, ServiceError, StartError};
pub use events::{Event, EventKind};
pub use service::{ElapsedProfiler, Profiler, ProfilerRef, ServiceAdapter, ServiceRef};
pub use signals::{ControllerState, LifecycleSignals, Signal};
