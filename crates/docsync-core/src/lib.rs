//! Live index synchronization: store driver boundary, reconciliation
//! planning, plan execution, and sync telemetry.
#![warn(unreachable_pub)]

pub mod driver;
pub mod error;
pub mod obs;
pub mod plan;
pub mod sync;

///
/// CONSTANTS
///

/// Name of the primary-key index every collection carries. Never dropped.
pub const DEFAULT_RESERVED_INDEX: &str = "_id_";

/// Per-call store timeout used when the caller does not supply one.
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 10_000;

///
/// Prelude
///
/// Vocabulary for callers wiring a synchronizer.
///

pub mod prelude {
    pub use crate::{
        driver::{IndexStoreDriver, LiveIndex, MemoryStore, StoreErrorKind},
        error::{StaleStateWarning, StoreOperationError, SyncError},
        obs::{CountingSink, SyncSink, TracingSink},
        plan::{ReconciliationPlan, ReservedIndexes},
        sync::{CancelFlag, SyncOptions, SyncState, SynchronizationResult, Synchronizer},
    };
}
