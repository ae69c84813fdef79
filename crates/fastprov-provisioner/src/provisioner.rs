//! Provisioner hub — registration, review requests, and the tick loop.
//!
//! Clouds, strategies, and queue listeners are registered explicitly at
//! startup. Each label gets its own `NodeProvisioner`, locked for the
//! duration of a tick, so ticks for the same label are serialized while
//! different labels can tick concurrently.
//!
//! `suggest_review_now` only records the label and wakes the loop; any
//! number of requests for the same label before the loop wakes collapse
//! into one tick.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use fastprov_core::{
    Cloud, CloudRegistry, CloudSet, Label, LoadStatistics, ReviewRequester, Strategy,
};

use crate::node::{NodeProvisioner, TickReport};

type NodeSlot = Arc<Mutex<NodeProvisioner>>;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Provisioner {
    load: Arc<dyn LoadStatistics>,
    clouds: RwLock<CloudSet>,
    strategies: RwLock<Vec<Arc<dyn Strategy>>>,
    /// Per-label bookkeeping: label → node provisioner.
    nodes: Mutex<HashMap<Option<Label>, NodeSlot>>,
    /// Labels waiting for an immediate review.
    reviews: Mutex<BTreeSet<Option<Label>>>,
    wake: Notify,
}

impl Provisioner {
    pub fn new(load: Arc<dyn LoadStatistics>) -> Self {
        Self {
            load,
            clouds: RwLock::new(CloudSet::default()),
            strategies: RwLock::new(Vec::new()),
            nodes: Mutex::new(HashMap::new()),
            reviews: Mutex::new(BTreeSet::new()),
            wake: Notify::new(),
        }
    }

    pub fn register_cloud(&self, cloud: Arc<dyn Cloud>) {
        let mut clouds = self.clouds.write().unwrap_or_else(PoisonError::into_inner);
        debug!(cloud = cloud.name(), "registered cloud");
        *clouds = clouds.with_cloud(cloud);
    }

    /// Strategies are consulted in registration order.
    pub fn register_strategy(&self, strategy: Arc<dyn Strategy>) {
        debug!(strategy = strategy.name(), "registered strategy");
        self.strategies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(strategy);
    }

    fn strategies(&self) -> Vec<Arc<dyn Strategy>> {
        self.strategies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn node(&self, label: Option<&Label>) -> NodeSlot {
        lock(&self.nodes)
            .entry(label.cloned())
            .or_insert_with(|| Arc::new(Mutex::new(NodeProvisioner::new(label.cloned()))))
            .clone()
    }

    /// Start tracking a label so periodic ticks cover it.
    pub fn watch_label(&self, label: Option<&Label>) {
        self.node(label);
    }

    /// Labels with a node provisioner.
    pub fn labels(&self) -> Vec<Option<Label>> {
        let mut labels: Vec<Option<Label>> = lock(&self.nodes).keys().cloned().collect();
        labels.sort();
        labels
    }

    /// Launches in flight for `label`.
    pub fn planned_capacity(&self, label: Option<&Label>) -> u32 {
        let existing = lock(&self.nodes).get(&label.cloned()).cloned();
        existing.map_or(0, |slot| {
            let node = lock(&slot);
            node.planned_capacity()
        })
    }

    /// Labels currently waiting for an immediate review.
    pub fn pending_reviews(&self) -> Vec<Option<Label>> {
        lock(&self.reviews).iter().cloned().collect()
    }

    /// Run one tick for `label`.
    pub fn tick(&self, label: Option<&Label>) -> TickReport {
        let slot = self.node(label);
        let clouds = self.clouds();
        let strategies = self.strategies();
        let mut node = lock(&slot);
        node.tick(&clouds, self.load.as_ref(), &strategies)
    }

    /// Tick every known label.
    pub fn tick_all(&self) -> Vec<TickReport> {
        self.labels()
            .iter()
            .map(|label| self.tick(label.as_ref()))
            .collect()
    }

    /// Tick every label with an outstanding review request.
    pub fn review_now(&self) -> Vec<TickReport> {
        let labels = std::mem::take(&mut *lock(&self.reviews));
        labels
            .iter()
            .map(|label| self.tick(label.as_ref()))
            .collect()
    }

    /// Run the provisioning loop until `shutdown` flips.
    ///
    /// Ticks every known label each `interval`, and reviewed labels as
    /// soon as a review is requested.
    pub async fn run(self: Arc<Self>, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(interval_ms = interval_millis(interval), "provisioner started");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let reports = self.tick_all();
                    debug!(labels = reports.len(), "periodic tick");
                }
                _ = self.wake.notified() => {
                    let reports = self.review_now();
                    debug!(labels = reports.len(), "review tick");
                }
                _ = shutdown.changed() => {
                    info!("provisioner shutting down");
                    break;
                }
            }
        }
    }
}

/// Whole milliseconds in `interval`, saturating at `u64::MAX`.
fn interval_millis(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX)
}

impl CloudRegistry for Provisioner {
    fn clouds(&self) -> CloudSet {
        self.clouds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ReviewRequester for Provisioner {
    fn suggest_review_now(&self, label: Option<&Label>) {
        self.watch_label(label);
        let inserted = lock(&self.reviews).insert(label.cloned());
        if inserted {
            debug!(label = %Label::describe(label), "review requested");
        }
        self.wake.notify_one();
    }
}
