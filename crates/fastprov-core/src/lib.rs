//! fastprov-core — shared data model for the fast provisioning loop.
//!
//! Holds everything the capacity strategy, the host framework, and the
//! daemon agree on:
//!
//! - **`Label`** — capability tag set identifying a class of work
//! - **`LoadSnapshot`** — point-in-time load for one label
//! - **`PlannedLaunch`** — one worker slot that a pool is creating
//! - **`StrategyState`** — per-tick accounting handed to strategies
//! - Seams (`Cloud`, `ManagedPool`, `Strategy`, `SystemState`,
//!   `CloudRegistry`, `ReviewRequester`, `QueueListener`, `LoadStatistics`)
//! - **`FastProvConfig`** — TOML configuration
//!
//! # Capacity accounting
//!
//! ```text
//! available_capacity = available_executors
//!                    + connecting_executors
//!                    + planned_capacity     (grows as launches are recorded)
//! current_demand     = queue_length
//! ```

pub mod config;
pub mod error;
pub mod label;
pub mod launch;
pub mod pool;
pub mod queue;
pub mod snapshot;
pub mod strategy;
pub mod system;

pub use config::{DemandConfig, FastProvConfig, PoolConfig};
pub use error::{ConfigError, ConfigResult, PoolError, PoolResult};
pub use label::Label;
pub use launch::{LaunchCompleter, LaunchOutcome, PlannedLaunch};
pub use pool::{Cloud, CloudRegistry, CloudSet, ManagedPool};
pub use queue::{BuildableItem, QueueListener, ReviewRequester};
pub use snapshot::{LoadSnapshot, LoadStatistics};
pub use strategy::{PoolFault, Strategy, StrategyDecision, StrategyState};
pub use system::{DrainSwitch, ProvisioningSettings, SystemState};
