//! Collaborator seams: the managed service and the optional profiler.
//!
//! ## Contents
//! - [`ServiceAdapter`] the service being started/stopped ([`ServiceRef`] = `Arc<dyn ServiceAdapter>`)
//! - [`Profiler`] hook bracketed around each run, [`ElapsedProfiler`] built-in implementation

mod adapter;
mod profiler;

pub use adapter::{ServiceAdapter, ServiceRef};
pub use profiler::{ElapsedProfiler, Profiler, ProfilerRef};
