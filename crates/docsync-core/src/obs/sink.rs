//! Sync sink boundary.
//!
//! The synchronizer only knows `SyncEvent` and `SyncSink`; logging and
//! counting are sink implementations.

use crate::{
    error::{StaleStateWarning, StoreOperationError},
    sync::SyncState,
};
use std::sync::Arc;

///
/// SyncEvent
///
/// One observation from a synchronization run. Borrowed from the run so
/// sinks decide what to copy.
///

#[derive(Clone, Copy, Debug)]
pub enum SyncEvent<'a> {
    RunStart {
        collection: &'a str,
    },
    FetchFailed {
        collection: &'a str,
        error: &'a StoreOperationError,
    },
    Planned {
        collection: &'a str,
        creates: usize,
        drops: usize,
        conflicts: usize,
    },
    Conflict {
        collection: &'a str,
        error: &'a StoreOperationError,
    },
    CreateApplied {
        collection: &'a str,
        index: &'a str,
        already_present: bool,
    },
    CreateFailed {
        collection: &'a str,
        error: &'a StoreOperationError,
    },
    DropApplied {
        collection: &'a str,
        index: &'a str,
    },
    StaleDrop {
        collection: &'a str,
        warning: &'a StaleStateWarning,
    },
    DropFailed {
        collection: &'a str,
        error: &'a StoreOperationError,
    },
    Cancelled {
        collection: &'a str,
        skipped: usize,
    },
    RunFinish {
        collection: &'a str,
        state: SyncState,
        applied: usize,
        failed: usize,
    },
}

impl SyncEvent<'_> {
    #[must_use]
    pub const fn collection(&self) -> &str {
        match *self {
            Self::RunStart { collection }
            | Self::FetchFailed { collection, .. }
            | Self::Planned { collection, .. }
            | Self::Conflict { collection, .. }
            | Self::CreateApplied { collection, .. }
            | Self::CreateFailed { collection, .. }
            | Self::DropApplied { collection, .. }
            | Self::StaleDrop { collection, .. }
            | Self::DropFailed { collection, .. }
            | Self::Cancelled { collection, .. }
            | Self::RunFinish { collection, .. } => collection,
        }
    }
}

///
/// SyncSink
///

pub trait SyncSink: Send + Sync {
    fn record(&self, event: &SyncEvent<'_>);
}

impl<S: SyncSink + ?Sized> SyncSink for Arc<S> {
    fn record(&self, event: &SyncEvent<'_>) {
        (**self).record(event);
    }
}

///
/// TracingSink
/// Default sink: one structured `tracing` event per observation.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl SyncSink for TracingSink {
    fn record(&self, event: &SyncEvent<'_>) {
        match *event {
            SyncEvent::RunStart { collection } => {
                tracing::debug!(collection, "index sync started");
            }
            SyncEvent::FetchFailed { collection, error } => {
                tracing::warn!(collection, %error, "listing live indexes failed");
            }
            SyncEvent::Planned {
                collection,
                creates,
                drops,
                conflicts,
            } => {
                tracing::debug!(collection, creates, drops, conflicts, "index plan computed");
            }
            SyncEvent::Conflict { collection, error } => {
                tracing::warn!(collection, %error, "index name conflict left untouched");
            }
            SyncEvent::CreateApplied {
                collection,
                index,
                already_present,
            } => {
                tracing::info!(collection, index, already_present, "index created");
            }
            SyncEvent::CreateFailed { collection, error } => {
                tracing::warn!(collection, %error, "index create failed");
            }
            SyncEvent::DropApplied { collection, index } => {
                tracing::info!(collection, index, "index dropped");
            }
            SyncEvent::StaleDrop {
                collection,
                warning,
            } => {
                tracing::warn!(collection, index = %warning.index, "index already dropped");
            }
            SyncEvent::DropFailed { collection, error } => {
                tracing::warn!(collection, %error, "index drop failed");
            }
            SyncEvent::Cancelled {
                collection,
                skipped,
            } => {
                tracing::warn!(collection, skipped, "index sync cancelled");
            }
            SyncEvent::RunFinish {
                collection,
                state,
                applied,
                failed,
            } => {
                tracing::info!(collection, %state, applied, failed, "index sync finished");
            }
        }
    }
}

///
/// FanoutSink
/// Forwards every event to each inner sink, in order.
///

#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn SyncSink>>,
}

impl FanoutSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, sink: Arc<dyn SyncSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl SyncSink for FanoutSink {
    fn record(&self, event: &SyncEvent<'_>) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}
