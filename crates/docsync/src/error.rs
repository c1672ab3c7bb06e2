use docsync_config::ConfigError;
use docsync_core::error::{StoreOperationError, SyncError};
use docsync_schema::error::{ConfigurationError, ResolveError};
use serde::Serialize;
use thiserror::Error as ThisError;

pub use docsync_core::error::{ErrorClass, ErrorOrigin};

///
/// Error
/// Public error type with a stable class + origin taxonomy.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    pub(crate) fn unknown_type(name: &str) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Schema,
            format!("unknown persistable type '{name}'"),
        )
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Registry(err) => err.into(),
            ConfigError::Io { .. } => {
                Self::new(ErrorClass::Unavailable, ErrorOrigin::Config, err.to_string())
            }
            ConfigError::Parse(_) | ConfigError::InvalidTimeout => {
                Self::new(ErrorClass::InvalidInput, ErrorOrigin::Config, err.to_string())
            }
        }
    }
}

impl From<ConfigurationError> for Error {
    fn from(err: ConfigurationError) -> Self {
        Self::new(ErrorClass::Configuration, ErrorOrigin::Schema, err.to_string())
    }
}

impl From<ResolveError> for Error {
    fn from(err: ResolveError) -> Self {
        SyncError::from(err).into()
    }
}

impl From<SyncError> for Error {
    fn from(err: SyncError) -> Self {
        Self::new(err.class(), err.origin(), err.to_string())
    }
}

impl From<StoreOperationError> for Error {
    fn from(err: StoreOperationError) -> Self {
        Self::new(err.class(), ErrorOrigin::Store, err.to_string())
    }
}
