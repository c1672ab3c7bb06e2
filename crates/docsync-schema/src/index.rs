//! Module: index
//! Responsibility: canonical, comparable index specifications.
//! Does not own: declaration resolution or store reconciliation.
//! Boundary: the resolver builds `IndexSpec`s, the synchronizer compares them.

use crate::path::{FieldPath, FieldPathFault};
use derive_more::{Deref, IntoIterator};
use serde::Serialize;
use std::{
    cmp::Ordering,
    collections::{BTreeSet, btree_set},
    fmt::{self, Display},
    hash::{Hash, Hasher},
};
use thiserror::Error as ThisError;

///
/// Direction
///
/// Sort direction of one key part. Declarations only produce `Asc` today;
/// `Desc` exists so live keys and future declaration syntax share one shape.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Numeric form used in canonical index names (`1` / `-1`).
    #[must_use]
    pub const fn as_i8(self) -> i8 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }

    #[must_use]
    pub const fn from_i8(value: i8) -> Option<Self> {
        match value {
            1 => Some(Self::Asc),
            -1 => Some(Self::Desc),
            _ => None,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

///
/// KeyPart
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct KeyPart {
    pub path: FieldPath,
    pub direction: Direction,
}

impl KeyPart {
    #[must_use]
    pub const fn new(path: FieldPath, direction: Direction) -> Self {
        Self { path, direction }
    }

    #[must_use]
    pub const fn asc(path: FieldPath) -> Self {
        Self::new(path, Direction::Asc)
    }

    #[must_use]
    pub const fn desc(path: FieldPath) -> Self {
        Self::new(path, Direction::Desc)
    }
}

impl Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.path, self.direction)
    }
}

///
/// IndexKeyError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum IndexKeyError {
    #[error("index key has no fields")]
    Empty,

    #[error("invalid field path '{path}': {fault}")]
    InvalidPath { path: String, fault: FieldPathFault },
}

///
/// IndexKey
///
/// Ordered key of one index. Order is significant: stores match queries
/// against key prefixes.
///
/// Invariants:
/// - at least one part
/// - no field path appears twice
///

#[derive(Clone, Debug, Deref, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct IndexKey(Vec<KeyPart>);

impl IndexKey {
    pub fn new(parts: Vec<KeyPart>) -> Result<Self, IndexKeyError> {
        if parts.is_empty() {
            return Err(IndexKeyError::Empty);
        }

        let mut seen = BTreeSet::new();
        for part in &parts {
            if !seen.insert(part.path.as_str()) {
                return Err(IndexKeyError::InvalidPath {
                    path: part.path.to_string(),
                    fault: FieldPathFault::Duplicate,
                });
            }
        }

        Ok(Self(parts))
    }

    /// Build an all-ascending key from raw path strings.
    pub fn ascending<I, S>(paths: I) -> Result<Self, IndexKeyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parts = paths
            .into_iter()
            .map(|raw| {
                let raw = raw.as_ref();
                FieldPath::parse(raw)
                    .map(KeyPart::asc)
                    .map_err(|fault| IndexKeyError::InvalidPath {
                        path: raw.to_string(),
                        fault,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(parts)
    }

    #[must_use]
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    #[must_use]
    pub fn contains_path(&self, path: &FieldPath) -> bool {
        self.0.iter().any(|part| &part.path == path)
    }

    /// Whether this key is a strict leading prefix of `other`.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// Deterministic store-facing name: `<path>_<dir>` parts joined by `_`.
    #[must_use]
    pub fn canonical_name(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .0
            .iter()
            .map(|part| format!("{}: {}", part.path, part.direction))
            .collect::<Vec<_>>()
            .join(", ");

        write!(f, "{{ {parts} }}")
    }
}

///
/// IndexSpec
///
/// Resolved, canonical index. Identity is the key; the name is derived from
/// it and only ever used as a lookup proxy.
///

#[derive(Clone, Debug, Serialize)]
pub struct IndexSpec {
    key: IndexKey,
    name: String,
}

impl IndexSpec {
    #[must_use]
    pub fn new(key: IndexKey) -> Self {
        let name = key.canonical_name();

        Self { key, name }
    }

    #[must_use]
    pub const fn key(&self) -> &IndexKey {
        &self.key
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for IndexSpec {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for IndexSpec {}

impl PartialOrd for IndexSpec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexSpec {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl Hash for IndexSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.key)
    }
}

///
/// IndexSet
///
/// Resolved specifications for one collection. A set, not a sequence:
/// application order never changes the final store state.
///

#[derive(Clone, Debug, Default, Deref, Eq, IntoIterator, PartialEq, Serialize)]
#[into_iterator(owned, ref)]
#[serde(transparent)]
pub struct IndexSet(BTreeSet<IndexSpec>);

impl IndexSet {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Insert a spec; returns `false` when an equal key was already present.
    pub fn insert(&mut self, spec: IndexSpec) -> bool {
        self.0.insert(spec)
    }

    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&IndexSpec> {
        self.0.iter().find(|spec| spec.name() == name)
    }

    #[must_use]
    pub fn contains_key(&self, key: &IndexKey) -> bool {
        self.0.iter().any(|spec| spec.key() == key)
    }

    /// Canonical names in key order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(IndexSpec::name)
    }

    pub fn iter(&self) -> btree_set::Iter<'_, IndexSpec> {
        self.0.iter()
    }
}

impl FromIterator<IndexSpec> for IndexSet {
    fn from_iter<T: IntoIterator<Item = IndexSpec>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
