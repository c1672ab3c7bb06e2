//! TOML metadata source and synchronization options.
//!
//! A `Config` describes templates, persistable types and their index
//! declarations, plus the options every synchronizer run uses. It feeds a
//! `RegistryBuilder`; all structural validation happens there.

mod error;
mod model;

pub use error::ConfigError;
pub use model::{Config, IndexConfig, SyncConfig, TemplateConfig, TypeConfig};
