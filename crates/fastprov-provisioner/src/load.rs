//! In-memory load statistics.
//!
//! Counters are kept per exact label. The queue bumps `queue_length` when
//! work arrives, the provisioner bumps `available` when a launched worker
//! joins, and `try_assign` consumes one of each when work is handed to a
//! worker. `connecting` is reported as zero: a slot stays in the
//! provisioner's planned capacity until its worker has joined.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use fastprov_core::{Label, LoadSnapshot, LoadStatistics};

#[derive(Debug, Default)]
pub struct InMemoryLoad {
    counters: Mutex<HashMap<Option<Label>, LoadSnapshot>>,
}

impl InMemoryLoad {
    pub fn new() -> Self {
        Self::default()
    }

    fn counters(&self) -> MutexGuard<'_, HashMap<Option<Label>, LoadSnapshot>> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update<R>(&self, label: Option<&Label>, f: impl FnOnce(&mut LoadSnapshot) -> R) -> R {
        let mut counters = self.counters();
        f(counters.entry(label.cloned()).or_default())
    }

    /// One more unit of work waiting for `label`.
    pub fn enqueue(&self, label: Option<&Label>) {
        self.update(label, |s| s.queue_length = s.queue_length.saturating_add(1));
    }

    pub fn add_available(&self, label: Option<&Label>, count: u32) {
        self.update(label, |s| {
            s.available_executors = s.available_executors.saturating_add(count)
        });
    }

    /// Hand one waiting unit of work to one idle executor.
    ///
    /// Returns false, changing nothing, unless both are present.
    pub fn try_assign(&self, label: Option<&Label>) -> bool {
        self.update(label, |s| {
            if s.queue_length > 0 && s.available_executors > 0 {
                s.queue_length -= 1;
                s.available_executors -= 1;
                true
            } else {
                false
            }
        })
    }

    /// Labels with any recorded activity.
    pub fn labels(&self) -> Vec<Option<Label>> {
        self.counters().keys().cloned().collect()
    }
}

impl LoadStatistics for InMemoryLoad {
    fn snapshot(&self, label: Option<&Label>) -> LoadSnapshot {
        self.counters()
            .get(&label.cloned())
            .copied()
            .unwrap_or_default()
    }

    fn worker_joined(&self, label: Option<&Label>, worker: &str) {
        self.add_available(label, 1);
        debug!(label = %Label::describe(label), %worker, "worker available");
    }
}
