//! Metadata and resolution errors.

use crate::path::FieldPathFault;
use serde::Serialize;
use thiserror::Error as ThisError;

///
/// ConfigProblem
///
/// One structural problem found while building a registry.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, ThisError)]
#[remain::sorted]
pub enum ConfigProblem {
    #[error("type '{type_name}' resolves keys {first} and {second} to the same index name '{name}'")]
    CanonicalNameCollision {
        type_name: String,
        name: String,
        first: String,
        second: String,
    },

    #[error("collection '{collection}' is claimed by both '{first}' and '{second}'")]
    DuplicateCollectionName {
        collection: String,
        first: String,
        second: String,
    },

    #[error("template '{name}' is declared more than once")]
    DuplicateTemplateName { name: String },

    #[error("type '{name}' is declared more than once")]
    DuplicateTypeName { name: String },

    #[error("type '{type_name}' has an empty collection name")]
    EmptyCollectionName { type_name: String },

    #[error("a template has an empty name")]
    EmptyTemplateName,

    #[error("a type for collection '{collection}' has an empty name")]
    EmptyTypeName { collection: String },

    #[error("type id {index} was not minted by this registry")]
    ForeignTypeId { index: usize },

    #[error("type '{type_name}' is part of a supertype cycle")]
    SupertypeCycle { type_name: String },

    #[error("type '{type_name}' extends unknown type '{supertype}'")]
    UnknownSupertype {
        type_name: String,
        supertype: String,
    },

    #[error("type '{type_name}' references unknown template '{template}'")]
    UnknownTemplate { type_name: String, template: String },
}

///
/// ConfigurationError
///
/// Aggregated registry problems. Fatal: a registry is never built from
/// metadata that produced one.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, ThisError)]
#[error("invalid index metadata: {}", join_problems(.problems))]
pub struct ConfigurationError {
    pub problems: Vec<ConfigProblem>,
}

impl ConfigurationError {
    #[must_use]
    pub const fn new(problems: Vec<ConfigProblem>) -> Self {
        Self { problems }
    }

    #[must_use]
    pub fn single(problem: ConfigProblem) -> Self {
        Self::new(vec![problem])
    }

    #[must_use]
    pub fn contains(&self, problem: &ConfigProblem) -> bool {
        self.problems.contains(problem)
    }
}

fn join_problems(problems: &[ConfigProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

///
/// InvalidFieldPathError
///
/// A malformed field path in one declaration. `type_name` is the type being
/// resolved, `declared_on` the type that carries the declaration (a
/// supertype when the declaration is inherited).
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, ThisError)]
#[error(
    "type '{type_name}' has invalid field path '{path}' (declared on '{declared_on}'): {fault}"
)]
pub struct InvalidFieldPathError {
    pub type_name: String,
    pub declared_on: String,
    pub path: String,
    pub fault: FieldPathFault,
}

///
/// ResolveError
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, ThisError)]
pub enum ResolveError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    InvalidFieldPath(#[from] InvalidFieldPathError),
}

impl ResolveError {
    /// Name of the type whose resolution failed, when known.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::InvalidFieldPath(err) => Some(&err.type_name),
            Self::Configuration(err) => err.problems.iter().find_map(|problem| match problem {
                ConfigProblem::CanonicalNameCollision { type_name, .. }
                | ConfigProblem::UnknownTemplate { type_name, .. }
                | ConfigProblem::UnknownSupertype { type_name, .. }
                | ConfigProblem::SupertypeCycle { type_name }
                | ConfigProblem::EmptyCollectionName { type_name } => Some(type_name.as_str()),
                _ => None,
            }),
        }
    }
}
