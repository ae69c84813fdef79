//! Strategy seam and per-tick state.

use tracing::trace;

use crate::error::PoolError;
use crate::label::Label;
use crate::launch::PlannedLaunch;
use crate::pool::CloudSet;
use crate::snapshot::LoadSnapshot;

/// Result of one strategy invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyDecision {
    /// Capacity meets or exceeds demand; stop consulting strategies.
    ProvisioningCompleted,
    /// Capacity is still short (or this strategy declined); let the next
    /// registered strategy act.
    ConsultRemainingStrategies,
}

/// A fault raised by one pool during a tick.
#[derive(Debug)]
pub struct PoolFault {
    pub pool: String,
    pub error: PoolError,
}

/// Mutable accounting for one tick of one label.
///
/// The snapshot is fixed for the whole tick. The planned capacity starts
/// at the framework's figure and grows as launches are recorded, so later
/// pools in the same scan see the updated total.
#[derive(Debug)]
pub struct StrategyState {
    label: Option<Label>,
    snapshot: LoadSnapshot,
    planned_capacity: u32,
    launches: Vec<PlannedLaunch>,
    faults: Vec<PoolFault>,
}

impl StrategyState {
    pub fn new(label: Option<Label>, snapshot: LoadSnapshot, planned_capacity: u32) -> Self {
        Self {
            label,
            snapshot,
            planned_capacity,
            launches: Vec::new(),
            faults: Vec::new(),
        }
    }

    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    pub fn snapshot(&self) -> &LoadSnapshot {
        &self.snapshot
    }

    /// Planned capacity including every launch recorded so far this tick.
    pub fn planned_capacity_snapshot(&self) -> u32 {
        self.planned_capacity
    }

    /// `available + connecting + planned`.
    pub fn available_capacity(&self) -> u32 {
        self.snapshot
            .available_executors
            .saturating_add(self.snapshot.connecting_executors)
            .saturating_add(self.planned_capacity)
    }

    pub fn current_demand(&self) -> u32 {
        self.snapshot.queue_length
    }

    /// Record launches granted by a pool. Returns how many were recorded.
    pub fn record_pending_launches(&mut self, launches: Vec<PlannedLaunch>) -> u32 {
        let count = u32::try_from(launches.len()).unwrap_or(u32::MAX);
        self.planned_capacity = self.planned_capacity.saturating_add(count);
        self.launches.extend(launches);
        trace!(
            recorded = count,
            planned = self.planned_capacity,
            "recorded pending launches"
        );
        count
    }

    /// Record a pool fault for the framework to surface after the tick.
    pub fn record_fault(&mut self, pool: impl Into<String>, error: PoolError) {
        self.faults.push(PoolFault {
            pool: pool.into(),
            error,
        });
    }

    pub fn launches(&self) -> &[PlannedLaunch] {
        &self.launches
    }

    pub fn faults(&self) -> &[PoolFault] {
        &self.faults
    }

    /// Hand recorded launches and faults back to the framework.
    pub fn into_parts(self) -> (Vec<PlannedLaunch>, Vec<PoolFault>) {
        (self.launches, self.faults)
    }
}

/// A provisioning strategy consulted by the framework on every tick.
///
/// `clouds` is the framework's view of registered pools for this tick.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, state: &mut StrategyState, clouds: &CloudSet) -> StrategyDecision;
}
