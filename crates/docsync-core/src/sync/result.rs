use crate::{
    error::{StaleStateWarning, StoreOperationError},
    plan::ReconciliationPlan,
};
use derive_more::Display;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

///
/// SyncState
///
/// Per-collection, per-run lifecycle:
/// `Fetched -> Planned -> Applying -> {Completed | PartiallyFailed | Cancelled}`.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum SyncState {
    #[display("fetched")]
    Fetched,
    #[display("planned")]
    Planned,
    #[display("applying")]
    Applying,
    #[display("completed")]
    Completed,
    #[display("partially_failed")]
    PartiallyFailed,
    #[display("cancelled")]
    Cancelled,
}

impl SyncState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::PartiallyFailed | Self::Cancelled
        )
    }

    /// Whether `next` is a legal successor of this state.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Fetched, Self::Planned)
                | (Self::Planned, Self::Applying)
                | (
                    Self::Applying,
                    Self::Completed | Self::PartiallyFailed | Self::Cancelled
                )
        )
    }
}

///
/// SynchronizationResult
///
/// Per-index outcome of one run against one collection. Every name in the
/// executed plan lands in exactly one of `applied`, `failed` or `skipped`;
/// conflicts land in `failed`.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SynchronizationResult {
    pub collection: String,
    pub plan: ReconciliationPlan,
    pub state: SyncState,
    pub applied: BTreeSet<String>,
    pub failed: BTreeMap<String, StoreOperationError>,
    pub warnings: Vec<StaleStateWarning>,
    pub skipped: BTreeSet<String>,
}

impl SynchronizationResult {
    /// A run whose live listing for `collection` was just fetched.
    pub(crate) fn fetched(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            plan: ReconciliationPlan {
                collection: collection.to_string(),
                ..ReconciliationPlan::default()
            },
            state: SyncState::Fetched,
            applied: BTreeSet::new(),
            failed: BTreeMap::new(),
            warnings: Vec::new(),
            skipped: BTreeSet::new(),
        }
    }

    /// Attach the plan computed from the fetched listing.
    pub(crate) fn planned(&mut self, plan: ReconciliationPlan) {
        self.plan = plan;
        self.advance(SyncState::Planned);
    }

    /// Move to `next`; illegal transitions indicate a synchronizer bug.
    pub(crate) fn advance(&mut self, next: SyncState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal sync transition {} -> {next}",
            self.state
        );
        self.state = next;
    }

    /// Terminal state implied by the recorded outcomes.
    pub(crate) fn settled_state(&self) -> SyncState {
        if !self.skipped.is_empty() {
            SyncState::Cancelled
        } else if !self.failed.is_empty() {
            SyncState::PartiallyFailed
        } else {
            SyncState::Completed
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.state == SyncState::Completed
    }

    /// Whether the run found nothing to change.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.plan.is_empty() && self.plan.conflicts.is_empty()
    }

    #[must_use]
    pub fn error_for(&self, name: &str) -> Option<&StoreOperationError> {
        self.failed.get(name)
    }
}
