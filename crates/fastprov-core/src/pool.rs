//! Backend pool seams.
//!
//! The framework registers every kind of cloud it knows about. Only the
//! ones that return `Some` from [`Cloud::as_managed`] take part in fast
//! provisioning; everything else is ignored by the strategy.

use std::fmt;
use std::sync::Arc;

use crate::error::PoolResult;
use crate::label::Label;
use crate::launch::PlannedLaunch;

/// Any pool registered with the framework.
pub trait Cloud: Send + Sync {
    fn name(&self) -> &str;

    /// Downcast to a managed pool. Unrelated pool kinds keep the default.
    fn as_managed(&self) -> Option<&dyn ManagedPool> {
        None
    }
}

/// A pool that can create worker slots on demand.
pub trait ManagedPool: Cloud {
    /// Whether this pool can serve work carrying `label`.
    fn can_provision(&self, label: Option<&Label>) -> bool;

    /// Start creating up to `count` worker slots for `label`.
    ///
    /// May grant fewer than requested, including none. Must not block
    /// until the workers are ready; the returned launches resolve later.
    fn provision(&self, label: Option<&Label>, count: u32) -> PoolResult<Vec<PlannedLaunch>>;
}

/// Read-only view of the registered clouds, in registration order.
///
/// Cloning is cheap; the underlying list is shared and never mutated.
#[derive(Clone)]
pub struct CloudSet {
    clouds: Arc<[Arc<dyn Cloud>]>,
}

impl CloudSet {
    pub fn new(clouds: Vec<Arc<dyn Cloud>>) -> Self {
        Self {
            clouds: clouds.into(),
        }
    }

    /// A new set with `cloud` appended. The receiver is unchanged.
    pub fn with_cloud(&self, cloud: Arc<dyn Cloud>) -> Self {
        let mut clouds = self.clouds.to_vec();
        clouds.push(cloud);
        Self::new(clouds)
    }

    pub fn len(&self) -> usize {
        self.clouds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clouds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Cloud> {
        self.clouds.iter().map(|c| c.as_ref())
    }

    /// Managed pools only, in registration order.
    pub fn managed(&self) -> impl Iterator<Item = &dyn ManagedPool> {
        self.iter().filter_map(|c| c.as_managed())
    }
}

/// Anything that can hand out the current set of registered clouds.
pub trait CloudRegistry: Send + Sync {
    fn clouds(&self) -> CloudSet;
}

impl CloudRegistry for CloudSet {
    fn clouds(&self) -> CloudSet {
        self.clone()
    }
}

impl Default for CloudSet {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl fmt::Debug for CloudSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|c| c.name())).finish()
    }
}
