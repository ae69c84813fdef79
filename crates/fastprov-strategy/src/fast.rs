//! Fast provisioning strategy.
//!
//! Per tick and label:
//!
//! 1. Defer while the system is quieting down.
//! 2. Collect managed pools (other cloud kinds are ignored).
//! 3. Optionally shuffle the consultation order.
//! 4. For each pool that can serve the label, request the remaining gap
//!    between demand and capacity. Stop at the first pool after which
//!    capacity covers demand.
//! 5. If every pool was consulted and demand is still uncovered, defer to
//!    the remaining strategies.
//!
//! Demand and load come from the tick's single snapshot. Only the planned
//! capacity moves during the scan, as launches get recorded.
//!
//! A pool that errors or panics is recorded as a fault and the scan moves
//! on to the next pool.

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use fastprov_core::{
    CloudSet, Label, ManagedPool, PoolError, ProvisioningSettings, Strategy, StrategyDecision,
    StrategyState, SystemState,
};

use crate::guard::isolate;
use crate::order::PoolOrder;

/// Provisions exactly the capacity shortfall from managed pools.
pub struct FastProvisioningStrategy {
    system: Arc<dyn SystemState>,
    settings: Arc<dyn ProvisioningSettings>,
    order: PoolOrder,
}

impl FastProvisioningStrategy {
    pub fn new(system: Arc<dyn SystemState>, settings: Arc<dyn ProvisioningSettings>) -> Self {
        Self {
            system,
            settings,
            order: PoolOrder::from_os_rng(),
        }
    }

    /// Use a deterministic random source for pool ordering.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.order = PoolOrder::seeded(seed);
        self
    }

    /// Run one tick for the label carried by `state`.
    pub fn decide(&self, state: &mut StrategyState, clouds: &CloudSet) -> StrategyDecision {
        if self.system.is_quieting_down() {
            debug!(
                label = %Label::describe(state.label()),
                "quieting down, skipping provisioning"
            );
            return StrategyDecision::ConsultRemainingStrategies;
        }

        let pools: Vec<&dyn ManagedPool> = clouds.managed().collect();
        let order = self
            .order
            .sequence(pools.len(), self.settings.randomize_pool_order());

        for idx in order {
            let pool = pools[idx];
            match isolate(|| self.apply_to_pool(state, pool)) {
                Ok(StrategyDecision::ProvisioningCompleted) => {
                    return StrategyDecision::ProvisioningCompleted;
                }
                Ok(StrategyDecision::ConsultRemainingStrategies) => {}
                Err(message) => {
                    warn!(
                        pool = pool.name(),
                        label = %Label::describe(state.label()),
                        panic = %message,
                        "pool panicked, skipping"
                    );
                    state.record_fault(
                        pool.name(),
                        PoolError::Panicked {
                            pool: pool.name().to_string(),
                            message,
                        },
                    );
                }
            }
        }

        StrategyDecision::ConsultRemainingStrategies
    }

    fn apply_to_pool(&self, state: &mut StrategyState, pool: &dyn ManagedPool) -> StrategyDecision {
        if !pool.can_provision(state.label()) {
            trace!(
                pool = pool.name(),
                label = %Label::describe(state.label()),
                "pool cannot serve label"
            );
            return StrategyDecision::ConsultRemainingStrategies;
        }

        let snapshot = *state.snapshot();
        trace!(
            available = snapshot.available_executors,
            connecting = snapshot.connecting_executors,
            planned = state.planned_capacity_snapshot(),
            "load snapshot"
        );

        let mut available_capacity = state.available_capacity();
        let current_demand = state.current_demand();
        debug!(
            pool = pool.name(),
            available_capacity, current_demand, "evaluating pool"
        );

        if available_capacity < current_demand {
            let shortfall = current_demand - available_capacity;
            match pool.provision(state.label(), shortfall) {
                Ok(launches) => {
                    let granted = state.record_pending_launches(launches);
                    available_capacity = available_capacity.saturating_add(granted);
                    info!(
                        pool = pool.name(),
                        label = %Label::describe(state.label()),
                        requested = shortfall,
                        granted,
                        "planned new workers"
                    );
                    debug!(
                        available_capacity,
                        current_demand, "capacity after provisioning"
                    );
                }
                Err(e) => {
                    warn!(
                        pool = pool.name(),
                        requested = shortfall,
                        error = %e,
                        "pool failed to provision"
                    );
                    state.record_fault(pool.name(), e);
                }
            }
        }

        if available_capacity >= current_demand {
            debug!(pool = pool.name(), "provisioning completed");
            StrategyDecision::ProvisioningCompleted
        } else {
            debug!(
                pool = pool.name(),
                "provisioning not complete, consulting remaining pools"
            );
            StrategyDecision::ConsultRemainingStrategies
        }
    }
}

impl Strategy for FastProvisioningStrategy {
    fn name(&self) -> &str {
        "fast-provisioning"
    }

    fn apply(&self, state: &mut StrategyState, clouds: &CloudSet) -> StrategyDecision {
        self.decide(state, clouds)
    }
}
