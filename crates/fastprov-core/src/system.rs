//! Process-wide state consulted by strategies.

use std::sync::atomic::{AtomicBool, Ordering};

/// Global system state.
pub trait SystemState: Send + Sync {
    /// True while the system is shutting down or refusing new work.
    fn is_quieting_down(&self) -> bool;
}

/// Runtime-togglable settings, read fresh on every invocation.
pub trait ProvisioningSettings: Send + Sync {
    /// Consult pools in a fresh random order instead of registration order.
    fn randomize_pool_order(&self) -> bool;
}

impl ProvisioningSettings for AtomicBool {
    fn randomize_pool_order(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Atomic quiet-down flag flipped by the process on shutdown.
#[derive(Debug, Default)]
pub struct DrainSwitch {
    draining: AtomicBool,
}

impl DrainSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_drain(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }
}

impl SystemState for DrainSwitch {
    fn is_quieting_down(&self) -> bool {
        self.draining.load(Ordering::Relaxed)
    }
}
