//! Module: engine
//! Responsibility: wire a validated registry and sync options to a store
//! driver.
//! Does not own: resolution rules, planning or per-operation semantics.
//! Boundary: every error crossing this module becomes a public `Error`.

use crate::error::Error;
use docsync_config::Config;
use docsync_core::{
    driver::IndexStoreDriver,
    plan::ReconciliationPlan,
    sync::{SyncOptions, SynchronizationResult, Synchronizer},
};
use docsync_schema::{
    index::IndexSet,
    registry::Registry,
    resolve::{resolve_all, resolve_type},
};
use serde::Serialize;
use std::{collections::BTreeMap, path::Path};

///
/// Engine
///
/// Immutable registry plus the options every run uses. Build once at
/// startup, then resolve, plan or synchronize against any driver.
///

#[derive(Debug)]
pub struct Engine {
    registry: Registry,
    options: SyncOptions,
}

impl Engine {
    #[must_use]
    pub const fn new(registry: Registry, options: SyncOptions) -> Self {
        Self { registry, options }
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Ok(Self::new(config.registry()?, config.sync_options()))
    }

    pub fn from_toml_str(source: &str) -> Result<Self, Error> {
        Self::from_config(&Config::from_toml_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_config(&Config::load(path)?)
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub const fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Resolve one persistable type by name.
    pub fn resolve(&self, type_name: &str) -> Result<IndexSet, Error> {
        resolve_type(&self.registry, type_name)
            .ok_or_else(|| Error::unknown_type(type_name))?
            .map_err(Error::from)
    }

    /// Resolve every persistable type, keyed by collection.
    #[must_use]
    pub fn resolve_all(&self) -> BTreeMap<String, Result<IndexSet, Error>> {
        resolve_all(&self.registry)
            .into_iter()
            .map(|(collection, outcome)| (collection, outcome.map_err(Error::from)))
            .collect()
    }

    /// Synchronizer over `driver` using this engine's options and the
    /// default tracing sink.
    #[must_use]
    pub fn synchronizer<D: IndexStoreDriver>(&self, driver: D) -> Synchronizer<D> {
        Synchronizer::new(driver, self.options.clone())
    }

    /// Dry run: what each collection would need, without mutating it.
    pub fn plan_all<D: IndexStoreDriver>(
        &self,
        driver: D,
    ) -> BTreeMap<String, Result<ReconciliationPlan, Error>> {
        self.synchronizer(driver)
            .plan_all(&self.registry)
            .into_iter()
            .map(|(collection, outcome)| (collection, outcome.map_err(Error::from)))
            .collect()
    }

    pub fn synchronize_all<D: IndexStoreDriver>(&self, driver: D) -> SyncReport {
        self.synchronize_all_with(&self.synchronizer(driver))
    }

    /// Synchronize every collection through a caller-configured
    /// synchronizer (custom sink or cancel flag).
    pub fn synchronize_all_with<D: IndexStoreDriver>(&self, sync: &Synchronizer<D>) -> SyncReport {
        let mut report = SyncReport::default();

        for (collection, outcome) in sync.synchronize_all(&self.registry) {
            match outcome {
                Ok(result) => {
                    report.results.insert(collection, result);
                }
                Err(err) => {
                    report.errors.insert(collection, err.into());
                }
            }
        }

        report
    }
}

///
/// SyncReport
///
/// Outcome of synchronizing every collection. A collection appears in
/// exactly one of the two maps.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SyncReport {
    pub results: BTreeMap<String, SynchronizationResult>,
    pub errors: BTreeMap<String, Error>,
}

impl SyncReport {
    /// Whether every collection completed without failures.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.results.values().all(SynchronizationResult::is_success)
    }

    /// Collections that ended with failed or skipped operations.
    pub fn incomplete(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|(_, result)| !result.is_success())
            .map(|(collection, _)| collection.as_str())
    }

    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.results.values().map(|result| result.applied.len()).sum()
    }
}
