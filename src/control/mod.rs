//! Lifecycle control: controller and the tasks of a run.
//!
//! The public API from this module is [`LifecycleController`] (built via [`ControllerBuilder`]).
//!
//! Internal modules:
//! - [`monitor`]: startup monitor, the task owned by the run handle;
//! - [`session`]: one run (prepare, start, readiness, teardown);
//! - [`watchdog`]: translates a stop request into a service stop call;
//! - [`slot`]: run handle and generation counter behind the decision lock;
//! - [`context`]: per-run identity shared by the tasks above.

mod builder;
mod context;
mod controller;
mod monitor;
mod session;
mod slot;
mod watchdog;

pub use builder::ControllerBuilder;
pub use controller::LifecycleController;
