//! Planned launches — worker slots that a pool has started creating.
//!
//! A pool hands back one `PlannedLaunch` per granted slot and keeps the
//! matching `LaunchCompleter`. When the worker is up (or the launch fails)
//! the pool resolves the completer; the provisioner polls the launch on
//! each tick and drops it from its planned capacity once resolved.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::label::Label;

static NEXT_LAUNCH_ID: AtomicU64 = AtomicU64::new(1);

type LaunchResult = Result<String, String>;

/// How a planned launch finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The worker joined under the given name.
    Ready(String),
    /// The launch failed or was abandoned by its pool.
    Failed(String),
}

/// One worker slot under creation.
#[derive(Debug)]
pub struct PlannedLaunch {
    id: u64,
    pool: String,
    label: Option<Label>,
    completion: oneshot::Receiver<LaunchResult>,
}

/// The pool's side of a planned launch.
#[derive(Debug)]
pub struct LaunchCompleter {
    id: u64,
    tx: oneshot::Sender<LaunchResult>,
}

impl PlannedLaunch {
    /// Create a planned launch and the completer the pool resolves later.
    pub fn new(pool: impl Into<String>, label: Option<Label>) -> (Self, LaunchCompleter) {
        let id = NEXT_LAUNCH_ID.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        let launch = Self {
            id,
            pool: pool.into(),
            label,
            completion: rx,
        };
        (launch, LaunchCompleter { id, tx })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Name of the pool creating this slot.
    pub fn pool(&self) -> &str {
        &self.pool
    }

    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    /// Non-blocking check for completion.
    ///
    /// Returns `None` while the slot is still being created. A completer
    /// dropped without resolving counts as a failed launch.
    pub fn poll_outcome(&mut self) -> Option<LaunchOutcome> {
        match self.completion.try_recv() {
            Ok(Ok(worker)) => Some(LaunchOutcome::Ready(worker)),
            Ok(Err(reason)) => Some(LaunchOutcome::Failed(reason)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => {
                Some(LaunchOutcome::Failed("launch abandoned by pool".to_string()))
            }
        }
    }
}

impl LaunchCompleter {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Mark the slot as ready. A provisioner that already went away is ignored.
    pub fn ready(self, worker: impl Into<String>) {
        let _ = self.tx.send(Ok(worker.into()));
    }

    /// Mark the slot as failed.
    pub fn fail(self, reason: impl Into<String>) {
        let _ = self.tx.send(Err(reason.into()));
    }
}
