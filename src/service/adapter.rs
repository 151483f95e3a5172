//! # Managed service abstraction.
//!
//! This module defines the [`ServiceAdapter`] trait: the two capabilities the controller
//! needs from the long-running service it coordinates, plus an optional preparation hook.
//! The common handle type is [`ServiceRef`], an `Arc<dyn ServiceAdapter>`.
//!
//! The controller never inspects the service. It only sequences calls:
//! ```text
//! prepare() ──► run_async(on_ready) ──► [on_ready.set()] ... ──► stop()
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::signals::Signal;

/// Shared handle to a managed service.
pub type ServiceRef = Arc<dyn ServiceAdapter>;

/// # Long-running service driven by the controller.
///
/// ## Contract
/// - [`run_async`](ServiceAdapter::run_async) starts the service and returns; it must
///   eventually set `on_ready` once the service accepts work, or return an error.
///   Any internal concurrency it spawns is its own business.
/// - [`stop`](ServiceAdapter::stop) must be idempotent and safe even if readiness was
///   never reached.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use runvisor::{ServiceAdapter, ServiceError, Signal};
///
/// struct Emulator;
///
/// #[async_trait]
/// impl ServiceAdapter for Emulator {
///     fn name(&self) -> &str { "emulator" }
///
///     async fn run_async(&self, on_ready: Signal) -> Result<(), ServiceError> {
///         tokio::spawn(async move {
///             // bind sockets, load state...
///             on_ready.set();
///         });
///         Ok(())
///     }
///
///     async fn stop(&self) -> Result<(), ServiceError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait ServiceAdapter: Send + Sync + 'static {
    /// Returns a stable, human-readable service name.
    fn name(&self) -> &str;

    /// Applies environment/config side effects before the service is started.
    ///
    /// Called once per run, before [`run_async`](ServiceAdapter::run_async).
    async fn prepare(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Starts the service without waiting for it to finish.
    async fn run_async(&self, on_ready: Signal) -> Result<(), ServiceError>;

    /// Stops the service.
    async fn stop(&self) -> Result<(), ServiceError>;
}
