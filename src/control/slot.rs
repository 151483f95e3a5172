use tokio::task::JoinHandle;

use crate::signals::Signal;

/// Ownership of the currently active startup monitor.
///
/// Guarded by the controller's decision lock; never held across an `.await`.
#[derive(Debug, Default)]
pub(crate) struct RunSlot {
    /// Handle of the active monitor task (`None` when idle or already taken by `join`).
    pub handle: Option<JoinHandle<()>>,
    /// Number of runs spawned so far; the current run's id.
    pub generation: u64,
    /// Completion signal of the current run; see `RunContext::finished`.
    pub finished: Signal,
}
