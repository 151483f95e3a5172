//! # Settable, waitable boolean flag.
//!
//! [`Signal`] is a thin wrapper around [`tokio::sync::watch`] carrying a flag and a
//! counter of unset-to-set transitions.
//!
//! ## Rules
//! - `set()` is idempotent and wakes every current waiter; later waiters return immediately
//! - `clear()` moves the flag back to unset; waiters parked before the last `set()` still return
//! - clones share the same flag
//!
//! ## Example
//! ```rust
//! use runvisor::Signal;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let ready = Signal::new();
//! let waiter = ready.clone();
//! let handle = tokio::spawn(async move { waiter.wait().await });
//!
//! ready.set();
//! handle.await.unwrap();
//! assert!(ready.is_set());
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::{sync::watch, time};

/// Value carried by the watch channel.
///
/// `epoch` counts unset-to-set transitions, so a waiter parked before a `set()` can tell it
/// happened even if `clear()` ran before the waiter was polled again.
#[derive(Clone, Copy, Debug, Default)]
struct Flag {
    set: bool,
    epoch: u64,
}

/// Cross-task boolean signal.
///
/// Cheap to clone: every clone observes and drives the same underlying flag.
#[derive(Clone, Debug)]
pub struct Signal {
    tx: Arc<watch::Sender<Flag>>,
}

impl Signal {
    /// Creates a new unset signal.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Flag::default());
        Self { tx: Arc::new(tx) }
    }

    /// Sets the signal and wakes all waiters.
    ///
    /// Returns `true` if this call moved the signal from unset to set.
    pub fn set(&self) -> bool {
        self.tx.send_if_modified(|flag| {
            if flag.set {
                return false;
            }
            flag.set = true;
            flag.epoch = flag.epoch.wrapping_add(1);
            true
        })
    }

    /// Resets the signal to unset.
    pub fn clear(&self) {
        self.tx.send_if_modified(|flag| std::mem::replace(&mut flag.set, false));
    }

    /// Returns the current value without waiting.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.tx.borrow().set
    }

    /// Waits until the signal is set.
    ///
    /// Returns once the signal was set at any point after this call began, even if it has
    /// been cleared again since.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        let seen = *rx.borrow_and_update();
        if seen.set {
            return;
        }

        while rx.changed().await.is_ok() {
            let now = *rx.borrow_and_update();
            if now.set || now.epoch != seen.epoch {
                return;
            }
        }
    }

    /// Waits until the signal is set or `timeout` elapses.
    ///
    /// `None` waits forever. A zero timeout still observes an already-set signal.
    /// Returns whether the signal was set.
    pub async fn wait_timeout(&self, timeout: Option<Duration>) -> bool {
        match timeout {
            None => {
                self.wait().await;
                true
            }
            Some(dur) => time::timeout(dur, self.wait()).await.is_ok() || self.is_set(),
        }
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}
