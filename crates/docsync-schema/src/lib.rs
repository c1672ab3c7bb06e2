//! Declarative index metadata for persistable types: the type registry,
//! canonical index specifications, and the resolver that turns one into the
//! other.

pub mod error;
pub mod index;
pub mod node;
pub mod path;
pub mod registry;
pub mod resolve;

/// Separator between segments of a nested field path (`address.city`).
pub const PATH_SEPARATOR: char = '.';

///
/// Prelude
///
/// Domain vocabulary only. Errors and the resolver entrypoints are imported
/// from their modules.
///

pub mod prelude {
    pub use crate::{
        index::{Direction, IndexKey, IndexSet, IndexSpec, KeyPart},
        node::{IndexDeclaration, IndexTemplate, PersistableType, RawIndexDeclaration, TemplateRef},
        path::FieldPath,
        registry::{Registry, RegistryBuilder, TypeId},
    };
}
