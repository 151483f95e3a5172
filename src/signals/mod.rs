//! Lifecycle signals.
//!
//! ## Contents
//! - [`Signal`] settable, waitable boolean flag (watch-channel backed)
//! - [`LifecycleSignals`] the named signals of one controller
//! - [`ControllerState`] state derived from those signals

mod lifecycle;
mod signal;

pub use lifecycle::{ControllerState, LifecycleSignals};
pub use signal::Signal;
