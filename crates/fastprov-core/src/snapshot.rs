//! Load snapshots.

use crate::label::Label;

/// Point-in-time load for one label.
///
/// Taken once at the start of a tick; every decision within the tick
/// reads from the same snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSnapshot {
    /// Idle executors that can take work now.
    pub available_executors: u32,
    /// Executors that exist but have not joined yet.
    pub connecting_executors: u32,
    /// Units of work waiting for this label.
    pub queue_length: u32,
}

impl LoadSnapshot {
    pub fn new(available_executors: u32, connecting_executors: u32, queue_length: u32) -> Self {
        Self {
            available_executors,
            connecting_executors,
            queue_length,
        }
    }
}

/// Load bookkeeping maintained by the host framework.
///
/// Workers join through the framework: when a planned launch resolves,
/// the provisioner drops it from planned capacity and calls
/// `worker_joined` before taking the next snapshot, so a worker is never
/// counted as both planned and available.
pub trait LoadStatistics: Send + Sync {
    fn snapshot(&self, label: Option<&Label>) -> LoadSnapshot;

    /// A launched worker is now an available executor for `label`.
    fn worker_joined(&self, label: Option<&Label>, worker: &str);
}
