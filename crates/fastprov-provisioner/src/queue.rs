//! In-memory build queue.
//!
//! Listeners are registered explicitly at startup and called
//! synchronously, in registration order, on the thread that enqueues.
//! Waiting items are kept per label in arrival order; `take` hands the
//! oldest one to an idle executor.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::debug;

use fastprov_core::{BuildableItem, Label, QueueListener};

use crate::load::InMemoryLoad;

type Waiting = HashMap<Option<Label>, VecDeque<BuildableItem>>;

pub struct BuildQueue {
    load: Arc<InMemoryLoad>,
    listeners: RwLock<Vec<Arc<dyn QueueListener>>>,
    /// Lock order: `waiting`, then the load counters.
    waiting: Mutex<Waiting>,
    next_id: AtomicU64,
}

impl BuildQueue {
    pub fn new(load: Arc<InMemoryLoad>) -> Self {
        Self {
            load,
            listeners: RwLock::new(Vec::new()),
            waiting: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn waiting(&self) -> MutexGuard<'_, Waiting> {
        self.waiting.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register_listener(&self, listener: Arc<dyn QueueListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Add a buildable item and notify every listener.
    pub fn enter_buildable(&self, label: Option<Label>) -> BuildableItem {
        let item = BuildableItem {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            assigned_label: label,
        };
        {
            let mut waiting = self.waiting();
            waiting
                .entry(item.assigned_label.clone())
                .or_default()
                .push_back(item.clone());
            self.load.enqueue(item.assigned_label.as_ref());
        }
        debug!(
            item = item.id,
            label = %Label::describe(item.assigned_label.as_ref()),
            "item entered buildable state"
        );

        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in &listeners {
            listener.on_enter_buildable(&item);
        }
        item
    }

    /// Remove the oldest waiting item for `label` and assign it to an idle
    /// executor. Returns `None` when no item is waiting or no executor is
    /// available.
    pub fn take(&self, label: Option<&Label>) -> Option<BuildableItem> {
        let mut waiting = self.waiting();
        let items = waiting.get_mut(&label.cloned())?;
        if items.is_empty() || !self.load.try_assign(label) {
            return None;
        }
        let item = items.pop_front()?;
        debug!(
            item = item.id,
            label = %Label::describe(label),
            "item assigned to executor"
        );
        Some(item)
    }

    /// Number of items waiting for `label`.
    pub fn waiting_len(&self, label: Option<&Label>) -> usize {
        self.waiting().get(&label.cloned()).map_or(0, VecDeque::len)
    }

    /// Labels that have had work enqueued.
    pub fn labels(&self) -> Vec<Option<Label>> {
        let mut labels: Vec<Option<Label>> = self.waiting().keys().cloned().collect();
        labels.sort();
        labels
    }
}
