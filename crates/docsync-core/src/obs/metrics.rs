use crate::obs::sink::{SyncEvent, SyncSink};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

///
/// SyncCounters
/// Ephemeral, in-memory counters for synchronization runs.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SyncCounters {
    pub runs: u64,
    pub fetch_failures: u64,
    pub creates: u64,
    pub creates_already_present: u64,
    pub create_failures: u64,
    pub drops: u64,
    pub stale_drops: u64,
    pub drop_failures: u64,
    pub conflicts: u64,
    pub cancelled_runs: u64,
    pub collections: BTreeMap<String, CollectionCounters>,
}

///
/// CollectionCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct CollectionCounters {
    pub runs: u64,
    pub creates: u64,
    pub drops: u64,
    pub failures: u64,
}

impl SyncCounters {
    fn collection_mut(&mut self, collection: &str) -> &mut CollectionCounters {
        self.collections.entry(collection.to_string()).or_default()
    }

    fn apply(&mut self, event: &SyncEvent<'_>) {
        let collection = event.collection();

        match *event {
            SyncEvent::RunStart { .. } => {
                self.runs = self.runs.saturating_add(1);
                let entry = self.collection_mut(collection);
                entry.runs = entry.runs.saturating_add(1);
            }
            SyncEvent::FetchFailed { .. } => {
                self.fetch_failures = self.fetch_failures.saturating_add(1);
                bump_failures(self.collection_mut(collection));
            }
            SyncEvent::Conflict { .. } => {
                self.conflicts = self.conflicts.saturating_add(1);
                bump_failures(self.collection_mut(collection));
            }
            SyncEvent::CreateApplied {
                already_present, ..
            } => {
                self.creates = self.creates.saturating_add(1);
                if already_present {
                    self.creates_already_present = self.creates_already_present.saturating_add(1);
                }
                let entry = self.collection_mut(collection);
                entry.creates = entry.creates.saturating_add(1);
            }
            SyncEvent::CreateFailed { .. } => {
                self.create_failures = self.create_failures.saturating_add(1);
                bump_failures(self.collection_mut(collection));
            }
            SyncEvent::DropApplied { .. } | SyncEvent::StaleDrop { .. } => {
                self.drops = self.drops.saturating_add(1);
                if matches!(event, SyncEvent::StaleDrop { .. }) {
                    self.stale_drops = self.stale_drops.saturating_add(1);
                }
                let entry = self.collection_mut(collection);
                entry.drops = entry.drops.saturating_add(1);
            }
            SyncEvent::DropFailed { .. } => {
                self.drop_failures = self.drop_failures.saturating_add(1);
                bump_failures(self.collection_mut(collection));
            }
            SyncEvent::Cancelled { .. } => {
                self.cancelled_runs = self.cancelled_runs.saturating_add(1);
            }
            SyncEvent::Planned { .. } | SyncEvent::RunFinish { .. } => {}
        }
    }
}

const fn bump_failures(entry: &mut CollectionCounters) {
    entry.failures = entry.failures.saturating_add(1);
}

///
/// CountingSink
/// Aggregates events into `SyncCounters`; shareable across threads.
///

#[derive(Debug, Default)]
pub struct CountingSink {
    counters: Mutex<SyncCounters>,
}

impl CountingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn counters(&self) -> MutexGuard<'_, SyncCounters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Point-in-time copy of the counters.
    #[must_use]
    pub fn snapshot(&self) -> SyncCounters {
        self.counters().clone()
    }

    pub fn reset(&self) {
        *self.counters() = SyncCounters::default();
    }
}

impl SyncSink for CountingSink {
    fn record(&self, event: &SyncEvent<'_>) {
        self.counters().apply(event);
    }
}
