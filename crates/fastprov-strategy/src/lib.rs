//! fastprov-strategy — fast-reacting capacity provisioning.
//!
//! Two components plug into the host framework:
//!
//! - **`FastProvisioningStrategy`** — on each tick, compares capacity with
//!   demand for one label and asks managed pools for exactly the
//!   shortfall, stopping as soon as demand is covered.
//! - **`EarlyWakeListener`** — when new work becomes buildable, asks the
//!   framework to re-run provisioning for its label right away.
//!
//! # Flow
//!
//! ```text
//! queue event ──▶ EarlyWakeListener ──▶ suggest_review_now(label)
//!                                            │
//!                                            ▼
//!                             FastProvisioningStrategy::apply
//!                                 ├── pool A: can_provision? provision(gap)
//!                                 ├── pool B: ...          (skipped once covered)
//!                                 └── decision
//! ```

pub mod fast;
mod guard;
pub mod order;
pub mod wake;

pub use fast::FastProvisioningStrategy;
pub use order::PoolOrder;
pub use wake::EarlyWakeListener;

#[cfg(test)]
mod test_support;
