//! # Controller configuration.
//!
//! Provides [`Config`] centralized settings for a [`LifecycleController`](crate::LifecycleController).
//!
//! ## Sentinel values
//! - `startup_timeout = 0s` → unbounded readiness wait in [`scoped`](crate::LifecycleController::scoped)
//!
//! ## Environment
//! [`Config::from_env`] overlays the defaults with:
//! - `RUNVISOR_PROFILING` (`1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off`)
//! - `RUNVISOR_STARTUP_TIMEOUT_SECS` (non-negative integer seconds)

use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable toggling the profiling session.
pub const ENV_PROFILING: &str = "RUNVISOR_PROFILING";
/// Environment variable overriding the startup timeout, in whole seconds.
pub const ENV_STARTUP_TIMEOUT_SECS: &str = "RUNVISOR_STARTUP_TIMEOUT_SECS";

/// Configuration for the lifecycle controller.
///
/// ## Field semantics
/// - `profiling`: run a profiling session alongside each run
/// - `startup_timeout`: readiness bound used by fixture-style helpers (`0s` = unbounded)
/// - `bus_capacity`: lifecycle event ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Whether a [`Profiler`](crate::Profiler) is active for the duration of each run.
    pub profiling: bool,

    /// How long fixture-style helpers wait for readiness before giving up.
    ///
    /// - `Duration::ZERO` = wait forever
    /// - `> 0` = bounded wait
    pub startup_timeout: Duration,

    /// Capacity of the lifecycle event broadcast channel.
    ///
    /// Receivers lagging behind more than `bus_capacity` events skip the oldest ones.
    pub bus_capacity: usize,
}

impl Config {
    /// Builds a configuration from the process environment.
    ///
    /// Unset variables keep their defaults; set but unparsable ones are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = lookup(ENV_PROFILING) {
            cfg.profiling = parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                key: ENV_PROFILING,
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup(ENV_STARTUP_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: ENV_STARTUP_TIMEOUT_SECS,
                value: raw.clone(),
            })?;
            cfg.startup_timeout = Duration::from_secs(secs);
        }
        Ok(cfg)
    }

    /// Returns the startup timeout as an `Option`.
    ///
    /// - `None` → wait forever
    /// - `Some(d)` → bounded wait
    #[inline]
    pub fn startup_timeout(&self) -> Option<Duration> {
        if self.startup_timeout == Duration::ZERO {
            None
        } else {
            Some(self.startup_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `profiling = false`
    /// - `startup_timeout = 30s`
    /// - `bus_capacity = 64`
    fn default() -> Self {
        Self {
            profiling: false,
            startup_timeout: Duration::from_secs(30),
            bus_capacity: 64,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
