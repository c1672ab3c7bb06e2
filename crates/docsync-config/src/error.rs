use docsync_schema::error::ConfigurationError;
use std::{io, path::PathBuf};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("sync.timeout_ms must be greater than zero")]
    InvalidTimeout,

    #[error(transparent)]
    Registry(#[from] ConfigurationError),
}
