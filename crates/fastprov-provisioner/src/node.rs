//! Per-label provisioning bookkeeping.

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use fastprov_core::{
    CloudSet, Label, LaunchOutcome, LoadStatistics, PlannedLaunch, PoolFault, Strategy,
    StrategyDecision, StrategyState,
};

/// Outcome of one tick for one label.
#[derive(Debug)]
pub struct TickReport {
    pub label: Option<Label>,
    pub decision: StrategyDecision,
    /// Launches recorded by strategies during this tick.
    pub launched: u32,
    /// Earlier launches that finished successfully since the last tick.
    pub ready: u32,
    /// Earlier launches that failed since the last tick.
    pub failed: u32,
    /// Pool faults raised during this tick.
    pub faults: Vec<PoolFault>,
}

/// Tracks launches in flight for one label (or for unlabeled work).
#[derive(Debug)]
pub struct NodeProvisioner {
    label: Option<Label>,
    pending: Vec<PlannedLaunch>,
}

impl NodeProvisioner {
    pub fn new(label: Option<Label>) -> Self {
        Self {
            label,
            pending: Vec::new(),
        }
    }

    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    /// Worker slots requested but not yet resolved.
    pub fn planned_capacity(&self) -> u32 {
        u32::try_from(self.pending.len()).unwrap_or(u32::MAX)
    }

    /// Drop resolved launches.
    ///
    /// Returns the names of workers that joined and the number of
    /// launches that failed.
    pub fn reap(&mut self) -> (Vec<String>, u32) {
        let mut ready = Vec::new();
        let mut failed = 0;
        let label = Label::describe(self.label.as_ref());
        self.pending.retain_mut(|launch| match launch.poll_outcome() {
            None => true,
            Some(LaunchOutcome::Ready(worker)) => {
                info!(
                    launch = launch.id(),
                    pool = launch.pool(),
                    %worker,
                    %label,
                    "worker launched"
                );
                ready.push(worker);
                false
            }
            Some(LaunchOutcome::Failed(reason)) => {
                failed += 1;
                warn!(
                    launch = launch.id(),
                    pool = launch.pool(),
                    %reason,
                    %label,
                    "worker launch failed"
                );
                false
            }
        });
        (ready, failed)
    }

    /// Run one provisioning tick.
    ///
    /// Resolved launches leave planned capacity and join the load before
    /// the snapshot is taken. Then `strategies` are consulted in order
    /// until one reports completion. Launches recorded along the way are
    /// adopted as pending.
    pub fn tick(
        &mut self,
        clouds: &CloudSet,
        load: &dyn LoadStatistics,
        strategies: &[Arc<dyn Strategy>],
    ) -> TickReport {
        let (joined, failed) = self.reap();
        for worker in &joined {
            load.worker_joined(self.label.as_ref(), worker);
        }
        let ready = u32::try_from(joined.len()).unwrap_or(u32::MAX);
        let snapshot = load.snapshot(self.label.as_ref());
        let mut state = StrategyState::new(self.label.clone(), snapshot, self.planned_capacity());

        let mut decision = StrategyDecision::ConsultRemainingStrategies;
        for strategy in strategies {
            decision = strategy.apply(&mut state, clouds);
            trace!(strategy = strategy.name(), ?decision, "strategy consulted");
            if decision == StrategyDecision::ProvisioningCompleted {
                break;
            }
        }

        let (launches, faults) = state.into_parts();
        let launched = u32::try_from(launches.len()).unwrap_or(u32::MAX);
        self.pending.extend(launches);

        if !faults.is_empty() {
            warn!(
                label = %Label::describe(self.label.as_ref()),
                faults = faults.len(),
                "pools faulted during tick"
            );
        }
        debug!(
            label = %Label::describe(self.label.as_ref()),
            ?decision,
            launched,
            planned = self.planned_capacity(),
            queue = snapshot.queue_length,
            "tick finished"
        );

        TickReport {
            label: self.label.clone(),
            decision,
            launched,
            ready,
            failed,
            faults,
        }
    }
}
