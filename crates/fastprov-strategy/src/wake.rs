//! Early wake on new work.
//!
//! When an item becomes buildable, every managed pool that can serve its
//! label triggers a review request so the provisioner runs now instead of
//! at its next periodic tick. Requests are fire-and-forget; coalescing is
//! the framework's job.

use std::sync::Arc;

use tracing::{debug, warn};

use fastprov_core::{BuildableItem, CloudRegistry, Label, QueueListener, ReviewRequester};

use crate::guard::isolate;

pub struct EarlyWakeListener {
    registry: Arc<dyn CloudRegistry>,
    reviewer: Arc<dyn ReviewRequester>,
}

impl EarlyWakeListener {
    pub fn new(registry: Arc<dyn CloudRegistry>, reviewer: Arc<dyn ReviewRequester>) -> Self {
        Self { registry, reviewer }
    }
}

impl QueueListener for EarlyWakeListener {
    fn on_enter_buildable(&self, item: &BuildableItem) {
        let label = item.assigned_label.as_ref();
        let clouds = self.registry.clouds();
        for pool in clouds.managed() {
            let serves = match isolate(|| pool.can_provision(label)) {
                Ok(serves) => serves,
                Err(message) => {
                    warn!(
                        item = item.id,
                        pool = pool.name(),
                        panic = %message,
                        "pool panicked on eligibility check, skipping"
                    );
                    false
                }
            };
            if serves {
                debug!(
                    item = item.id,
                    pool = pool.name(),
                    label = %Label::describe(label),
                    "new buildable item, requesting immediate review"
                );
                self.reviewer.suggest_review_now(label);
            }
        }
    }
}
