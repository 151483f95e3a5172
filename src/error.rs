//! Error types used by the lifecycle controller and its collaborators.
//!
//! This module defines three error enums:
//!
//! - [`ServiceError`]: faults raised by a [`ServiceAdapter`](crate::ServiceAdapter).
//! - [`StartError`]: why a caller did not observe readiness.
//! - [`ConfigError`]: invalid values while loading [`Config`](crate::Config) from the environment.
//!
//! All of them provide `as_label` for logging; the runtime errors also provide `as_message`.

use std::time::Duration;
use thiserror::Error;

/// # Faults raised by the managed service.
///
/// The controller never retries; a fault is reported once and ends the
/// phase it happened in.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Environment or configuration side effects could not be applied.
    #[error("prepare failed: {error}")]
    Prepare {
        /// The underlying error message.
        error: String,
    },

    /// The service failed before signalling readiness.
    #[error("start failed: {error}")]
    Start {
        /// The underlying error message.
        error: String,
    },

    /// The service failed to stop.
    #[error("stop failed: {error}")]
    Stop {
        /// The underlying error message.
        error: String,
    },
}

impl ServiceError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use runvisor::ServiceError;
    ///
    /// let err = ServiceError::Stop { error: "port busy".into() };
    /// assert_eq!(err.as_label(), "service_stop_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::Prepare { .. } => "service_prepare_failed",
            ServiceError::Start { .. } => "service_start_failed",
            ServiceError::Stop { .. } => "service_stop_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ServiceError::Prepare { error } => format!("prepare: {error}"),
            ServiceError::Start { error } => format!("start: {error}"),
            ServiceError::Stop { error } => format!("stop: {error}"),
        }
    }
}

/// # Reasons a caller did not observe readiness.
///
/// Returned by [`LifecycleController::wait_ready`](crate::LifecycleController::wait_ready).
/// None of them is fatal to the controller: a `Timeout` run may still become ready later.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    /// Readiness was not observed within the wait bound.
    #[error("service not ready after {timeout:?}")]
    Timeout {
        /// The bound that elapsed.
        timeout: Duration,
    },

    /// The service reported a start fault before becoming ready.
    #[error("service failed to start: {error}")]
    Failed {
        /// The fault reported by the service.
        error: String,
    },

    /// The run ended (or was stopped before it began) without becoming ready.
    #[error("service stopped before becoming ready")]
    Stopped,
}

impl StartError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use runvisor::StartError;
    /// use std::time::Duration;
    ///
    /// let err = StartError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "start_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StartError::Timeout { .. } => "start_timeout",
            StartError::Failed { .. } => "start_failed",
            StartError::Stopped => "start_stopped",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            StartError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            StartError::Failed { error } => format!("failed: {error}"),
            StartError::Stopped => "stopped before ready".to_string(),
        }
    }

    /// Indicates whether waiting longer could still succeed.
    ///
    /// Only [`StartError::Timeout`] leaves the run in a state that may become ready.
    pub fn is_transient(&self) -> bool {
        matches!(self, StartError::Timeout { .. })
    }
}

/// # Invalid configuration values.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value {value:?} for {key}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Raw value found.
        value: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Invalid { .. } => "config_invalid",
        }
    }
}
