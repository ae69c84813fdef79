//! fastprov-provisioner — the scheduling framework around strategies.
//!
//! Owns the bookkeeping the strategies read from and write to:
//!
//! - **`NodeProvisioner`** — per-label pending launches (planned capacity)
//! - **`Provisioner`** — registry of clouds and strategies, review
//!   requests, and the periodic tick loop
//! - **`BuildQueue`** — in-memory queue that fans events out to listeners
//! - **`InMemoryLoad`** — per-label executor and queue counters
//!
//! # Architecture
//!
//! ```text
//! Provisioner
//!   ├── CloudSet (copy-on-write, handed to strategies per tick)
//!   ├── strategies (consulted in registration order)
//!   ├── review set (labels waiting for an immediate tick, coalesced)
//!   └── per-label NodeProvisioner
//!       └── pending PlannedLaunch handles
//! ```

pub mod load;
pub mod node;
pub mod provisioner;
pub mod queue;

pub use load::InMemoryLoad;
pub use node::{NodeProvisioner, TickReport};
pub use provisioner::Provisioner;
pub use queue::BuildQueue;
