//! Field path identity.
//!
//! Invariants:
//! - A `FieldPath` is non-empty.
//! - It neither starts nor ends with the separator.
//! - Every segment between separators is non-empty.

use crate::PATH_SEPARATOR;
use derive_more::{Deref, Display};
use serde::Serialize;
use thiserror::Error as ThisError;

///
/// FieldPathFault
///
/// Reason a field path string was rejected.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, ThisError)]
#[remain::sorted]
pub enum FieldPathFault {
    #[error("path is repeated within one index key")]
    Duplicate,

    #[error("path is empty")]
    Empty,

    #[error("path contains an empty segment")]
    EmptySegment,

    #[error("path starts with a separator")]
    LeadingSeparator,

    #[error("path ends with a separator")]
    TrailingSeparator,
}

///
/// FieldPath
///
/// Dotted path to a (possibly nested) document field.
///

#[derive(Clone, Debug, Deref, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// Validate and wrap a raw path string.
    pub fn parse(raw: &str) -> Result<Self, FieldPathFault> {
        if raw.is_empty() {
            return Err(FieldPathFault::Empty);
        }
        if raw.starts_with(PATH_SEPARATOR) {
            return Err(FieldPathFault::LeadingSeparator);
        }
        if raw.ends_with(PATH_SEPARATOR) {
            return Err(FieldPathFault::TrailingSeparator);
        }
        if raw.split(PATH_SEPARATOR).any(str::is_empty) {
            return Err(FieldPathFault::EmptySegment);
        }

        Ok(Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate the path's segments, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(PATH_SEPARATOR)
    }

    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.0.contains(PATH_SEPARATOR)
    }
}

impl TryFrom<&str> for FieldPath {
    type Error = FieldPathFault;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}
