use crate::{
    DEFAULT_RESERVED_INDEX,
    driver::{DriverError, IndexStoreDriver, LiveIndex, StoreErrorKind},
};
use docsync_schema::index::IndexKey;
use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

const PRIMARY_KEY_FIELD: &str = "_id";

///
/// StoreCall
///
/// One driver call as observed by a `MemoryStore`, in arrival order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreCall {
    List { collection: String },
    Create { collection: String, name: String },
    Drop { collection: String, name: String },
}

///
/// Fault
///
/// Injected misbehaviour. Faults stay active until `clear_faults`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Fault {
    /// Every list call on the collection fails.
    List {
        collection: String,
        kind: StoreErrorKind,
    },

    /// Creating the named index fails without touching the catalog.
    Create { name: String, kind: StoreErrorKind },

    /// Dropping the named index fails without touching the catalog.
    Drop { name: String, kind: StoreErrorKind },

    /// Another process creates the named index right before our create lands.
    ConcurrentCreate { name: String },

    /// Another process drops the named index right before our drop lands.
    ConcurrentDrop { name: String },

    /// Every call takes this long; calls with a shorter timeout time out
    /// without being applied.
    Latency(Duration),
}

///
/// MemoryState
///

#[derive(Debug, Default)]
struct MemoryState {
    collections: BTreeMap<String, BTreeMap<String, IndexKey>>,
    faults: Vec<Fault>,
    calls: Vec<StoreCall>,
}

impl MemoryState {
    fn latency_exceeds(&self, timeout: Duration) -> Option<DriverError> {
        self.faults.iter().find_map(|fault| match fault {
            Fault::Latency(latency) if *latency > timeout => Some(DriverError::timeout(format!(
                "operation needs {latency:?}, timeout is {timeout:?}"
            ))),
            _ => None,
        })
    }

    fn has_fault(&self, wanted: impl Fn(&Fault) -> Option<StoreErrorKind>) -> Option<StoreErrorKind> {
        self.faults.iter().find_map(wanted)
    }

    fn collection_mut(&mut self, collection: &str) -> &mut BTreeMap<String, IndexKey> {
        self.collections
            .entry(collection.to_string())
            .or_insert_with(|| {
                let mut indexes = BTreeMap::new();
                if let Ok(key) = IndexKey::ascending([PRIMARY_KEY_FIELD]) {
                    indexes.insert(DEFAULT_RESERVED_INDEX.to_string(), key);
                }
                indexes
            })
    }
}

///
/// MemoryStore
///
/// Process-local index catalog with document-store semantics: collections
/// are created implicitly with a primary `_id_` index, creating an existing
/// index reports `AlreadyExists`, dropping a missing one reports `NotFound`,
/// and the primary index cannot be dropped.
///

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the maps half-written, so
    // a poisoned lock is still usable.
    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a collection holding only its primary index.
    #[must_use]
    pub fn with_collection(self, collection: &str) -> Self {
        self.state().collection_mut(collection);
        self
    }

    /// Seed an index directly, bypassing faults and the call log.
    #[must_use]
    pub fn with_index(self, collection: &str, name: &str, key: IndexKey) -> Self {
        self.insert_index(collection, name, key);
        self
    }

    /// Insert an index as another process would, bypassing faults and the
    /// call log.
    pub fn insert_index(&self, collection: &str, name: &str, key: IndexKey) {
        self.state()
            .collection_mut(collection)
            .insert(name.to_string(), key);
    }

    /// Remove an index as another process would. Returns whether it existed.
    pub fn remove_index(&self, collection: &str, name: &str) -> bool {
        self.state()
            .collections
            .get_mut(collection)
            .is_some_and(|indexes| indexes.remove(name).is_some())
    }

    /// Snapshot of a collection's catalog, ordered by name.
    #[must_use]
    pub fn indexes(&self, collection: &str) -> Vec<LiveIndex> {
        self.state()
            .collections
            .get(collection)
            .map(|indexes| {
                indexes
                    .iter()
                    .map(|(name, key)| LiveIndex::new(name.clone(), key.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn index_names(&self, collection: &str) -> Vec<String> {
        self.indexes(collection)
            .into_iter()
            .map(|index| index.name)
            .collect()
    }

    pub fn inject(&self, fault: Fault) {
        self.state().faults.push(fault);
    }

    pub fn clear_faults(&self) {
        self.state().faults.clear();
    }

    /// Driver calls received so far, in arrival order.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }
}

impl IndexStoreDriver for MemoryStore {
    fn list_indexes(
        &self,
        collection: &str,
        timeout: Duration,
    ) -> Result<Vec<LiveIndex>, DriverError> {
        let mut state = self.state();
        state.calls.push(StoreCall::List {
            collection: collection.to_string(),
        });

        if let Some(err) = state.latency_exceeds(timeout) {
            return Err(err);
        }
        if let Some(kind) = state.has_fault(|fault| match fault {
            Fault::List {
                collection: target,
                kind,
            } if target == collection => Some(*kind),
            _ => None,
        }) {
            return Err(DriverError::new(kind, format!("listing '{collection}' failed")));
        }

        Ok(state
            .collections
            .get(collection)
            .map(|indexes| {
                indexes
                    .iter()
                    .map(|(name, key)| LiveIndex::new(name.clone(), key.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn create_index(
        &self,
        collection: &str,
        key: &IndexKey,
        name: &str,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        let mut state = self.state();
        state.calls.push(StoreCall::Create {
            collection: collection.to_string(),
            name: name.to_string(),
        });

        if let Some(err) = state.latency_exceeds(timeout) {
            return Err(err);
        }
        if let Some(kind) = state.has_fault(|fault| match fault {
            Fault::Create { name: target, kind } if target == name => Some(*kind),
            _ => None,
        }) {
            return Err(DriverError::new(kind, format!("creating '{name}' failed")));
        }

        let raced = state
            .faults
            .iter()
            .any(|fault| matches!(fault, Fault::ConcurrentCreate { name: target } if target == name));
        let indexes = state.collection_mut(collection);
        if raced {
            indexes.insert(name.to_string(), key.clone());
        }

        if let Some(existing) = indexes.get(name) {
            if existing == key {
                return Err(DriverError::already_exists(format!(
                    "index '{name}' already exists"
                )));
            }
            return Err(DriverError::conflict(format!(
                "index '{name}' already exists with key {existing}"
            )));
        }
        if let Some((other, _)) = indexes.iter().find(|(_, existing)| *existing == key) {
            return Err(DriverError::conflict(format!(
                "key {key} is already indexed as '{other}'"
            )));
        }

        indexes.insert(name.to_string(), key.clone());
        Ok(())
    }

    fn drop_index(
        &self,
        collection: &str,
        name: &str,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        let mut state = self.state();
        state.calls.push(StoreCall::Drop {
            collection: collection.to_string(),
            name: name.to_string(),
        });

        if let Some(err) = state.latency_exceeds(timeout) {
            return Err(err);
        }
        if let Some(kind) = state.has_fault(|fault| match fault {
            Fault::Drop { name: target, kind } if target == name => Some(*kind),
            _ => None,
        }) {
            return Err(DriverError::new(kind, format!("dropping '{name}' failed")));
        }
        if name == DEFAULT_RESERVED_INDEX {
            return Err(DriverError::rejected("cannot drop the primary index"));
        }

        let raced = state
            .faults
            .iter()
            .any(|fault| matches!(fault, Fault::ConcurrentDrop { name: target } if target == name));
        let Some(indexes) = state.collections.get_mut(collection) else {
            return Err(DriverError::not_found(format!(
                "collection '{collection}' not found"
            )));
        };
        if raced {
            indexes.remove(name);
        }

        match indexes.remove(name) {
            Some(_) => Ok(()),
            None => Err(DriverError::not_found(format!("index '{name}' not found"))),
        }
    }
}
