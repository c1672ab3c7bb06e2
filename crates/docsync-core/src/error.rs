use crate::driver::{DriverError, StoreErrorKind};
use derive_more::Display;
use docsync_schema::error::ResolveError;
use serde::Serialize;
use thiserror::Error as ThisError;

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ErrorClass {
    #[display("already_exists")]
    AlreadyExists,
    #[display("configuration")]
    Configuration,
    #[display("conflict")]
    Conflict,
    #[display("invalid_input")]
    InvalidInput,
    #[display("not_found")]
    NotFound,
    #[display("rejected")]
    Rejected,
    #[display("timeout")]
    Timeout,
    #[display("unavailable")]
    Unavailable,
}

///
/// ErrorOrigin
/// Component an error was raised in.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    #[display("config")]
    Config,
    #[display("schema")]
    Schema,
    #[display("resolve")]
    Resolve,
    #[display("store")]
    Store,
    #[display("sync")]
    Sync,
}

///
/// StoreOp
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum StoreOp {
    #[display("list")]
    List,
    #[display("create")]
    Create,
    #[display("drop")]
    Drop,
}

///
/// StoreOperationError
///
/// A list/create/drop call that failed against the store, with the
/// collection and index it targeted. Recorded per index in a
/// `SynchronizationResult`; never aborts the rest of a plan.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, ThisError)]
#[error("{op} failed on '{collection}'{}: {kind}: {message}", index_suffix(.index))]
pub struct StoreOperationError {
    pub op: StoreOp,
    pub collection: String,
    pub index: Option<String>,
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreOperationError {
    pub(crate) fn from_driver(
        op: StoreOp,
        collection: &str,
        index: Option<&str>,
        err: DriverError,
    ) -> Self {
        Self {
            op,
            collection: collection.to_string(),
            index: index.map(ToString::to_string),
            kind: err.kind,
            message: err.message,
        }
    }

    /// A live index holds a resolved spec's canonical name under another key.
    pub(crate) fn name_conflict(collection: &str, name: &str, live_key: &str) -> Self {
        Self {
            op: StoreOp::Create,
            collection: collection.to_string(),
            index: Some(name.to_string()),
            kind: StoreErrorKind::Conflict,
            message: format!("live index '{name}' has a different key {live_key}"),
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        self.kind.class()
    }
}

#[allow(clippy::ref_option)]
fn index_suffix(index: &Option<String>) -> String {
    index
        .as_deref()
        .map_or_else(String::new, |name| format!(" for index '{name}'"))
}

///
/// StaleStateWarning
///
/// A drop target vanished between listing and drop, typically because a
/// concurrent synchronizer removed it first. Counted as success.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, ThisError)]
#[error("index '{index}' on '{collection}' was already gone when dropped")]
pub struct StaleStateWarning {
    pub collection: String,
    pub index: String,
}

///
/// SyncError
///
/// Failure that prevents a collection from being planned at all.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SyncError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Fetch(StoreOperationError),
}

impl SyncError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Resolve(ResolveError::Configuration(_)) => ErrorClass::Configuration,
            Self::Resolve(ResolveError::InvalidFieldPath(_)) => ErrorClass::InvalidInput,
            Self::Fetch(err) => err.class(),
        }
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::Resolve(_) => ErrorOrigin::Resolve,
            Self::Fetch(_) => ErrorOrigin::Store,
        }
    }
}
