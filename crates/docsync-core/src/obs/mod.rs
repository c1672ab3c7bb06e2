//! Observability: sync telemetry and sink abstractions.
//!
//! Sync logic never logs or counts directly; every observation flows
//! through `SyncEvent` into a `SyncSink`.

mod metrics;
mod sink;

// re-exports
pub use metrics::{CollectionCounters, CountingSink, SyncCounters};
pub use sink::{FanoutSink, SyncEvent, SyncSink, TracingSink};
