//! Queue events and review requests.

use crate::label::Label;

/// A unit of work that just became runnable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildableItem {
    pub id: u64,
    pub assigned_label: Option<Label>,
}

/// Receives build-queue events. Called synchronously on the thread that
/// delivers the event.
pub trait QueueListener: Send + Sync {
    fn on_enter_buildable(&self, item: &BuildableItem);
}

/// Lets a listener ask the framework to re-run provisioning for a label
/// without waiting for the next periodic tick.
pub trait ReviewRequester: Send + Sync {
    fn suggest_review_now(&self, label: Option<&Label>);
}
