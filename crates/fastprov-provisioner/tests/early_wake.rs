//! End-to-end: queue event → early wake → fast strategy → pool → pending launches.

use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fastprov_core::{
    Cloud, DrainSwitch, Label, LaunchCompleter, LoadStatistics, ManagedPool, PlannedLaunch,
    PoolResult, StrategyDecision,
};
use fastprov_provisioner::{BuildQueue, InMemoryLoad, Provisioner};
use fastprov_strategy::{EarlyWakeListener, FastProvisioningStrategy};

/// Pool with a fixed slot budget that keeps completers for the test to resolve.
struct BudgetPool {
    name: String,
    tags: BTreeSet<String>,
    budget: Mutex<u32>,
    completers: Mutex<Vec<LaunchCompleter>>,
}

impl BudgetPool {
    fn new(name: &str, tags: &[&str], budget: u32) -> Self {
        Self {
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            budget: Mutex::new(budget),
            completers: Mutex::new(Vec::new()),
        }
    }

    fn complete_all(&self) -> usize {
        let completers: Vec<LaunchCompleter> = self.completers.lock().unwrap().drain(..).collect();
        let n = completers.len();
        for c in completers {
            let id = c.id();
            c.ready(format!("{}-{}", self.name, id));
        }
        n
    }
}

impl Cloud for BudgetPool {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_managed(&self) -> Option<&dyn ManagedPool> {
        Some(self)
    }
}

impl ManagedPool for BudgetPool {
    fn can_provision(&self, label: Option<&Label>) -> bool {
        label.is_some_and(|l| l.matches(&self.tags))
    }

    fn provision(&self, label: Option<&Label>, count: u32) -> PoolResult<Vec<PlannedLaunch>> {
        let mut budget = self.budget.lock().unwrap();
        let granted = count.min(*budget);
        *budget -= granted;
        let mut launches = Vec::new();
        for _ in 0..granted {
            let (launch, completer) = PlannedLaunch::new(self.name.clone(), label.cloned());
            launches.push(launch);
            self.completers.lock().unwrap().push(completer);
        }
        Ok(launches)
    }
}

struct Harness {
    load: Arc<InMemoryLoad>,
    queue: BuildQueue,
    provisioner: Arc<Provisioner>,
    drain: Arc<DrainSwitch>,
    east: Arc<BudgetPool>,
    west: Arc<BudgetPool>,
}

fn harness() -> Harness {
    let load = Arc::new(InMemoryLoad::new());
    let provisioner = Arc::new(Provisioner::new(load.clone()));
    let drain = Arc::new(DrainSwitch::new());

    let east = Arc::new(BudgetPool::new("east", &["linux", "docker"], 2));
    let west = Arc::new(BudgetPool::new("west", &["linux"], 10));
    provisioner.register_cloud(east.clone());
    provisioner.register_cloud(west.clone());

    let strategy = FastProvisioningStrategy::new(drain.clone(), Arc::new(AtomicBool::new(false)));
    provisioner.register_strategy(Arc::new(strategy));

    let queue = BuildQueue::new(load.clone());
    queue.register_listener(Arc::new(EarlyWakeListener::new(
        provisioner.clone(),
        provisioner.clone(),
    )));

    Harness {
        load,
        queue,
        provisioner,
        drain,
        east,
        west,
    }
}

#[test]
fn new_work_triggers_a_single_coalesced_review() {
    let h = harness();
    let linux = Label::parse("linux");

    for _ in 0..3 {
        h.queue.enter_buildable(linux.clone());
    }
    assert_eq!(h.provisioner.pending_reviews(), vec![linux.clone()]);

    let reports = h.provisioner.review_now();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].decision, StrategyDecision::ProvisioningCompleted);
    assert_eq!(reports[0].launched, 3);
    // east is consulted first and runs out of budget; west covers the rest.
    assert_eq!(h.east.completers.lock().unwrap().len(), 2);
    assert_eq!(h.west.completers.lock().unwrap().len(), 1);
}

#[test]
fn gap_spills_over_to_next_pool() {
    let h = harness();
    let label = Label::parse("docker linux");

    for _ in 0..5 {
        h.queue.enter_buildable(label.clone());
    }
    let reports = h.provisioner.review_now();
    assert_eq!(reports[0].decision, StrategyDecision::ConsultRemainingStrategies);
    assert_eq!(reports[0].launched, 2);
    assert_eq!(h.east.completers.lock().unwrap().len(), 2);
    // west does not offer "docker", so the remaining 3 stay unplanned.
    assert!(h.west.completers.lock().unwrap().is_empty());
    assert_eq!(h.provisioner.planned_capacity(label.as_ref()), 2);
}

#[test]
fn unserved_label_requests_no_review() {
    let h = harness();
    h.queue.enter_buildable(Label::parse("windows"));
    h.queue.enter_buildable(None);
    assert!(h.provisioner.pending_reviews().is_empty());
}

#[test]
fn completed_launches_leave_planned_capacity() {
    let h = harness();
    let linux = Label::parse("linux");
    for _ in 0..2 {
        h.queue.enter_buildable(linux.clone());
    }
    h.provisioner.review_now();
    assert_eq!(h.provisioner.planned_capacity(linux.as_ref()), 2);

    // Nothing can run until the workers have joined.
    assert_eq!(h.queue.take(linux.as_ref()), None);

    assert_eq!(h.east.complete_all(), 2);
    let report = h.provisioner.tick(linux.as_ref());
    assert_eq!(report.ready, 2);
    assert_eq!(report.launched, 0);
    assert_eq!(h.provisioner.planned_capacity(linux.as_ref()), 0);
    assert_eq!(h.load.snapshot(linux.as_ref()).available_executors, 2);

    assert!(h.queue.take(linux.as_ref()).is_some());
    assert!(h.queue.take(linux.as_ref()).is_some());
    assert_eq!(h.queue.take(linux.as_ref()), None);
    assert_eq!(h.load.snapshot(linux.as_ref()), Default::default());
}

#[test]
fn draining_stops_provisioning() {
    let h = harness();
    h.drain.begin_drain();
    let linux = Label::parse("linux");
    h.queue.enter_buildable(linux.clone());

    let reports = h.provisioner.review_now();
    assert_eq!(reports[0].decision, StrategyDecision::ConsultRemainingStrategies);
    assert_eq!(reports[0].launched, 0);
    assert!(h.east.completers.lock().unwrap().is_empty());
    assert!(h.west.completers.lock().unwrap().is_empty());
}

#[tokio::test]
async fn running_loop_reacts_before_the_periodic_tick() {
    let h = harness();
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let handle = tokio::spawn(
        h.provisioner
            .clone()
            .run(Duration::from_secs(3600), shutdown_rx),
    );
    tokio::time::sleep(Duration::from_millis(50)).await;

    let linux = Label::parse("linux");
    h.queue.enter_buildable(linux.clone());

    let provisioner = h.provisioner.clone();
    let reacted = tokio::time::timeout(Duration::from_secs(5), async move {
        while provisioner.planned_capacity(linux.as_ref()) == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(reacted.is_ok());

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}
