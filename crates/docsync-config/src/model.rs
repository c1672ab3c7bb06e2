use crate::ConfigError;
use docsync_core::{
    DEFAULT_RESERVED_INDEX, DEFAULT_STORE_TIMEOUT_MS,
    plan::ReservedIndexes,
    sync::SyncOptions,
};
use docsync_schema::{
    node::{IndexDeclaration, IndexTemplate, PersistableType, RawIndexDeclaration, TemplateRef},
    registry::{Registry, RegistryBuilder},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

///
/// Config
///
/// Root of a docsync TOML file. `[[template]]` and `[[type]]` tables map to
/// `templates` and `types`.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default, rename = "template")]
    pub templates: Vec<TemplateConfig>,

    #[serde(default, rename = "type")]
    pub types: Vec<TypeConfig>,
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(())
    }

    /// Builder seeded with every template and type in file order.
    #[must_use]
    pub fn registry_builder(&self) -> RegistryBuilder {
        let mut builder = RegistryBuilder::new();

        for template in &self.templates {
            builder.register_template(template.to_template());
        }
        for def in &self.types {
            builder.register_type(def.to_persistable());
        }

        builder
    }

    pub fn registry(&self) -> Result<Registry, ConfigError> {
        Ok(self.registry_builder().build()?)
    }

    #[must_use]
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions::default()
            .with_timeout(self.sync.timeout())
            .with_reserved(self.sync.reserved())
    }
}

///
/// SyncConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    #[serde(default = "SyncConfig::default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "SyncConfig::default_reserved_indexes")]
    pub reserved_indexes: Vec<String>,
}

impl SyncConfig {
    const fn default_timeout_ms() -> u64 {
        DEFAULT_STORE_TIMEOUT_MS
    }

    fn default_reserved_indexes() -> Vec<String> {
        vec![DEFAULT_RESERVED_INDEX.to_string()]
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn reserved(&self) -> ReservedIndexes {
        ReservedIndexes::new(self.reserved_indexes.iter().cloned())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            timeout_ms: Self::default_timeout_ms(),
            reserved_indexes: Self::default_reserved_indexes(),
        }
    }
}

///
/// TemplateConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    pub name: String,

    #[serde(default)]
    pub fields: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_field: Option<String>,
}

impl TemplateConfig {
    fn to_template(&self) -> IndexTemplate {
        let template = IndexTemplate::new(&self.name).with_fields(&self.fields);

        match &self.order_field {
            Some(order_field) => template.with_order_field(order_field),
            None => template,
        }
    }
}

///
/// TypeConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TypeConfig {
    pub name: String,
    pub collection: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    #[serde(default, rename = "index")]
    pub indexes: Vec<IndexConfig>,
}

impl TypeConfig {
    fn to_persistable(&self) -> PersistableType {
        let mut def = PersistableType::new(&self.name, &self.collection);
        if let Some(supertype) = &self.extends {
            def = def.extends(supertype);
        }

        self.indexes
            .iter()
            .fold(def, |def, index| def.declare(index.to_declaration()))
    }
}

///
/// IndexConfig
///
/// One `[[type.index]]` table. With `template` set it instantiates that
/// template; otherwise it declares an index directly.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default)]
    pub fields: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_field: Option<String>,
}

impl IndexConfig {
    #[must_use]
    pub fn to_declaration(&self) -> RawIndexDeclaration {
        match &self.template {
            Some(template) => {
                let reference = TemplateRef::new(template, &self.fields);
                match &self.order_field {
                    Some(order_field) => reference.with_order_field(order_field).into(),
                    None => reference.into(),
                }
            }
            None => {
                let decl = IndexDeclaration::new(&self.fields);
                match &self.order_field {
                    Some(order_field) => decl.with_order_field(order_field).into(),
                    None => decl.into(),
                }
            }
        }
    }
}
