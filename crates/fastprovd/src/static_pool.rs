//! Simulated managed pool with a fixed slot budget.
//!
//! Each granted slot resolves its launch with a worker name after
//! `launch_delay`; the provisioner registers the joined worker.
//! Slots are not returned to the budget; `max_slots` is the total number
//! of workers the pool will ever launch.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::debug;

use fastprov_core::{Cloud, Label, ManagedPool, PlannedLaunch, PoolConfig, PoolResult};

pub struct StaticPool {
    name: String,
    tags: BTreeSet<String>,
    serve_unlabeled: bool,
    launch_delay: Duration,
    remaining: Mutex<u32>,
    next_worker: AtomicU64,
    runtime: Handle,
}

impl StaticPool {
    pub fn from_config(config: &PoolConfig, runtime: Handle) -> Self {
        Self {
            name: config.name.clone(),
            tags: config.labels.clone(),
            serve_unlabeled: config.serve_unlabeled,
            launch_delay: Duration::from_millis(config.launch_delay_ms),
            remaining: Mutex::new(config.max_slots),
            next_worker: AtomicU64::new(1),
            runtime,
        }
    }

    /// Slots left in the budget.
    pub fn remaining(&self) -> u32 {
        *self.remaining.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Cloud for StaticPool {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_managed(&self) -> Option<&dyn ManagedPool> {
        Some(self)
    }
}

impl ManagedPool for StaticPool {
    fn can_provision(&self, label: Option<&Label>) -> bool {
        match label {
            Some(label) => label.matches(&self.tags),
            None => self.serve_unlabeled,
        }
    }

    fn provision(&self, label: Option<&Label>, count: u32) -> PoolResult<Vec<PlannedLaunch>> {
        let granted = {
            let mut remaining = self.remaining.lock().unwrap_or_else(PoisonError::into_inner);
            let granted = count.min(*remaining);
            *remaining -= granted;
            granted
        };
        debug!(
            pool = %self.name,
            requested = count,
            granted,
            remaining = self.remaining(),
            "static pool request"
        );

        let mut launches = Vec::with_capacity(granted as usize);
        for _ in 0..granted {
            let (launch, completer) = PlannedLaunch::new(self.name.clone(), label.cloned());
            let worker = format!(
                "{}-{}",
                self.name,
                self.next_worker.fetch_add(1, Ordering::Relaxed)
            );
            let delay = self.launch_delay;
            self.runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                completer.ready(worker);
            });
            launches.push(launch);
        }
        Ok(launches)
    }
}

#[cfg(test)]
mod tests {
    use fastprov_core::LaunchOutcome;

    use super::*;

    fn config(max_slots: u32) -> PoolConfig {
        PoolConfig {
            name: "sim".to_string(),
            labels: ["linux".to_string(), "docker".to_string()].into_iter().collect(),
            serve_unlabeled: false,
            max_slots,
            launch_delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn eligibility_follows_tags() {
        let pool = StaticPool::from_config(&config(1), Handle::current());
        assert!(pool.can_provision(Label::parse("linux").as_ref()));
        assert!(pool.can_provision(Label::parse("docker linux").as_ref()));
        assert!(!pool.can_provision(Label::parse("gpu").as_ref()));
        assert!(!pool.can_provision(None));
    }

    #[tokio::test]
    async fn grants_up_to_budget() {
        let pool = StaticPool::from_config(&config(3), Handle::current());
        let label = Label::parse("linux");

        assert_eq!(pool.provision(label.as_ref(), 2).unwrap().len(), 2);
        assert_eq!(pool.provision(label.as_ref(), 5).unwrap().len(), 1);
        assert_eq!(pool.provision(label.as_ref(), 5).unwrap().len(), 0);
        assert_eq!(pool.remaining(), 0);
    }

    #[tokio::test]
    async fn launch_resolves_with_worker_name() {
        let pool = StaticPool::from_config(&config(1), Handle::current());
        let label = Label::parse("linux");

        let mut launches = pool.provision(label.as_ref(), 1).unwrap();
        let mut launch = launches.pop().unwrap();

        let outcome = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(outcome) = launch.poll_outcome() {
                    return outcome;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        assert_eq!(outcome, LaunchOutcome::Ready("sim-1".to_string()));
    }
}
