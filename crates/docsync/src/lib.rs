//! ## Crate layout
//! - `schema`: persistable types, templates, registry, index specifications
//!   and the declaration resolver.
//! - `core`: store driver boundary, reconciliation planning, the
//!   synchronizer and sync telemetry.
//! - `config`: TOML metadata source and sync options.
//! - `engine`: `Engine`, wiring the three together.
//! - `error`: the public `Error` with a stable class + origin taxonomy.
//!
//! The `prelude` module exposes what a service needs to sync its indexes at
//! startup.

pub use docsync_config as config;
pub use docsync_core as core;
pub use docsync_schema as schema;

pub mod engine;
pub mod error;

pub use engine::{Engine, SyncReport};
pub use error::Error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Engine, Error, SyncReport,
        config::Config,
        core::{
            driver::{IndexStoreDriver, LiveIndex, MemoryStore},
            obs::{CountingSink, SyncSink, TracingSink},
            plan::ReconciliationPlan,
            sync::{CancelFlag, SyncOptions, SyncState, SynchronizationResult, Synchronizer},
        },
        error::{ErrorClass, ErrorOrigin},
        schema::{
            index::{IndexKey, IndexSet, IndexSpec},
            node::{IndexDeclaration, IndexTemplate, PersistableType, TemplateRef},
            registry::Registry,
        },
    };
}
