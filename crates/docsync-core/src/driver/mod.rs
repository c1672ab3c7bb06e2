//! Module: driver
//! Responsibility: the store boundary the synchronizer talks through.
//! Does not own: planning or outcome bookkeeping.
//! Boundary: real document-store clients implement `IndexStoreDriver`;
//! `MemoryStore` is the process-local implementation.

mod memory;

pub use memory::{Fault, MemoryStore, StoreCall};

use crate::error::ErrorClass;
use derive_more::Display;
use docsync_schema::index::IndexKey;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use thiserror::Error as ThisError;

///
/// StoreErrorKind
///
/// Store failure taxonomy every driver maps its native errors into.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum StoreErrorKind {
    /// Create target already exists with the same key.
    #[display("already_exists")]
    AlreadyExists,

    /// The store refuses the operation because of conflicting state.
    #[display("conflict")]
    Conflict,

    /// Drop target (or collection) does not exist.
    #[display("not_found")]
    NotFound,

    /// The store rejected the request as invalid.
    #[display("rejected")]
    Rejected,

    /// The call did not finish within the supplied timeout.
    #[display("timeout")]
    Timeout,

    /// The store could not be reached.
    #[display("unavailable")]
    Unavailable,
}

impl StoreErrorKind {
    #[must_use]
    pub const fn class(self) -> ErrorClass {
        match self {
            Self::AlreadyExists => ErrorClass::AlreadyExists,
            Self::Conflict => ErrorClass::Conflict,
            Self::NotFound => ErrorClass::NotFound,
            Self::Rejected => ErrorClass::Rejected,
            Self::Timeout => ErrorClass::Timeout,
            Self::Unavailable => ErrorClass::Unavailable,
        }
    }
}

///
/// DriverError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{kind}: {message}")]
pub struct DriverError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl DriverError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::NotFound, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::AlreadyExists, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Conflict, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Rejected, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Timeout, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unavailable, message)
    }
}

///
/// LiveIndex
///
/// One entry of a collection's live index catalog.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LiveIndex {
    pub name: String,
    pub key: IndexKey,
}

impl LiveIndex {
    pub fn new(name: impl Into<String>, key: IndexKey) -> Self {
        Self {
            name: name.into(),
            key,
        }
    }
}

///
/// IndexStoreDriver
///
/// Index catalog operations of a document store. Every call carries the
/// caller's timeout; a driver that cannot finish in time returns
/// `StoreErrorKind::Timeout`.
///
/// Implementations are shared across concurrent synchronizers, so methods
/// take `&self`.
///

pub trait IndexStoreDriver {
    /// List a collection's indexes. A missing collection lists as empty.
    fn list_indexes(
        &self,
        collection: &str,
        timeout: Duration,
    ) -> Result<Vec<LiveIndex>, DriverError>;

    /// Create an index named `name` over `key`.
    fn create_index(
        &self,
        collection: &str,
        key: &IndexKey,
        name: &str,
        timeout: Duration,
    ) -> Result<(), DriverError>;

    /// Drop the index named `name`.
    fn drop_index(&self, collection: &str, name: &str, timeout: Duration)
    -> Result<(), DriverError>;
}

impl<D: IndexStoreDriver + ?Sized> IndexStoreDriver for &D {
    fn list_indexes(
        &self,
        collection: &str,
        timeout: Duration,
    ) -> Result<Vec<LiveIndex>, DriverError> {
        (**self).list_indexes(collection, timeout)
    }

    fn create_index(
        &self,
        collection: &str,
        key: &IndexKey,
        name: &str,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        (**self).create_index(collection, key, name, timeout)
    }

    fn drop_index(
        &self,
        collection: &str,
        name: &str,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        (**self).drop_index(collection, name, timeout)
    }
}

impl<D: IndexStoreDriver + ?Sized> IndexStoreDriver for Arc<D> {
    fn list_indexes(
        &self,
        collection: &str,
        timeout: Duration,
    ) -> Result<Vec<LiveIndex>, DriverError> {
        (**self).list_indexes(collection, timeout)
    }

    fn create_index(
        &self,
        collection: &str,
        key: &IndexKey,
        name: &str,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        (**self).create_index(collection, key, name, timeout)
    }

    fn drop_index(
        &self,
        collection: &str,
        name: &str,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        (**self).drop_index(collection, name, timeout)
    }
}
