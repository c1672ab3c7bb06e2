//! Module: sync
//! Responsibility: fetch live state, plan, and apply index changes for one
//! collection per run.
//! Does not own: resolution (schema crate) or the store client (driver).
//! Boundary: every store call goes through `IndexStoreDriver`; every
//! observation goes through `SyncSink`.

mod options;
mod result;

use crate::{
    driver::{IndexStoreDriver, LiveIndex, StoreErrorKind},
    error::{StaleStateWarning, StoreOp, StoreOperationError, SyncError},
    obs::{SyncEvent, SyncSink, TracingSink},
    plan::ReconciliationPlan,
};
use docsync_schema::{
    index::{IndexSet, IndexSpec},
    registry::Registry,
    resolve::resolve,
};
use std::{collections::BTreeMap, sync::Arc};

// re-exports
pub use options::{CancelFlag, SyncOptions};
pub use result::{SyncState, SynchronizationResult};

///
/// PlannedOp
///

enum PlannedOp<'a> {
    Create(&'a IndexSpec),
    Drop(&'a str),
}

impl PlannedOp<'_> {
    fn name(&self) -> &str {
        match self {
            Self::Create(spec) => spec.name(),
            Self::Drop(name) => name,
        }
    }
}

///
/// Synchronizer
///
/// Reconciles live indexes with resolved specifications. Holds no state
/// between runs; several synchronizers may target one store concurrently.
///

pub struct Synchronizer<D> {
    driver: D,
    options: SyncOptions,
    sink: Arc<dyn SyncSink>,
    cancel: CancelFlag,
}

impl<D: IndexStoreDriver> Synchronizer<D> {
    pub fn new(driver: D, options: SyncOptions) -> Self {
        Self {
            driver,
            options,
            sink: Arc::new(TracingSink),
            cancel: CancelFlag::new(),
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn SyncSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    #[must_use]
    pub const fn options(&self) -> &SyncOptions {
        &self.options
    }

    #[must_use]
    pub const fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Compute the plan for `collection` against its current live listing
    /// without mutating anything.
    pub fn plan(
        &self,
        collection: &str,
        resolved: &IndexSet,
    ) -> Result<ReconciliationPlan, SyncError> {
        let live = self.fetch(collection)?;

        Ok(ReconciliationPlan::compute(
            collection,
            resolved,
            &live,
            &self.options.reserved,
        ))
    }

    /// Bring `collection` in line with `resolved`.
    ///
    /// Fails only when the live listing cannot be fetched; individual
    /// create/drop failures are recorded in the result.
    pub fn synchronize(
        &self,
        collection: &str,
        resolved: &IndexSet,
    ) -> Result<SynchronizationResult, SyncError> {
        self.sink.record(&SyncEvent::RunStart { collection });

        let live = self.fetch(collection)?;
        let mut result = SynchronizationResult::fetched(collection);

        result.planned(ReconciliationPlan::compute(
            collection,
            resolved,
            &live,
            &self.options.reserved,
        ));
        self.record_planned(&result.plan);
        self.execute(&mut result);

        Ok(result)
    }

    /// Apply a plan computed earlier. The plan is only as fresh as the
    /// listing it came from; stale entries surface as `AlreadyExists` or
    /// `NotFound` and are treated as success.
    #[must_use]
    pub fn apply(&self, plan: ReconciliationPlan) -> SynchronizationResult {
        self.sink.record(&SyncEvent::RunStart {
            collection: &plan.collection,
        });
        let mut result = SynchronizationResult::fetched(&plan.collection);

        result.planned(plan);
        self.record_planned(&result.plan);
        self.execute(&mut result);

        result
    }

    /// Resolve and synchronize every persistable type in `registry`, keyed
    /// by collection. One collection failing never stops the others.
    #[must_use]
    pub fn synchronize_all(
        &self,
        registry: &Registry,
    ) -> BTreeMap<String, Result<SynchronizationResult, SyncError>> {
        registry
            .iter()
            .map(|(id, def)| {
                let outcome = resolve(registry, id)
                    .map_err(SyncError::from)
                    .and_then(|resolved| self.synchronize(&def.collection, &resolved));

                (def.collection.clone(), outcome)
            })
            .collect()
    }

    /// Dry-run counterpart of `synchronize_all`.
    #[must_use]
    pub fn plan_all(
        &self,
        registry: &Registry,
    ) -> BTreeMap<String, Result<ReconciliationPlan, SyncError>> {
        registry
            .iter()
            .map(|(id, def)| {
                let outcome = resolve(registry, id)
                    .map_err(SyncError::from)
                    .and_then(|resolved| self.plan(&def.collection, &resolved));

                (def.collection.clone(), outcome)
            })
            .collect()
    }

    fn fetch(&self, collection: &str) -> Result<Vec<LiveIndex>, SyncError> {
        self.driver
            .list_indexes(collection, self.options.timeout)
            .map_err(|err| {
                let error = StoreOperationError::from_driver(StoreOp::List, collection, None, err);
                self.sink.record(&SyncEvent::FetchFailed {
                    collection,
                    error: &error,
                });

                SyncError::Fetch(error)
            })
    }

    fn record_planned(&self, plan: &ReconciliationPlan) {
        self.sink.record(&SyncEvent::Planned {
            collection: &plan.collection,
            creates: plan.to_create.len(),
            drops: plan.to_drop.len(),
            conflicts: plan.conflicts.len(),
        });
    }

    // Conflicts first, then every create, then every drop; the cancel flag
    // is checked before each store call.
    fn execute(&self, result: &mut SynchronizationResult) {
        result.advance(SyncState::Applying);

        let plan = result.plan.clone();
        let collection = plan.collection.as_str();

        for conflict in &plan.conflicts {
            let error = StoreOperationError::name_conflict(
                collection,
                &conflict.name,
                &conflict.live_key.to_string(),
            );
            self.sink.record(&SyncEvent::Conflict {
                collection,
                error: &error,
            });
            result.failed.insert(conflict.name.clone(), error);
        }

        let ops: Vec<PlannedOp<'_>> = plan
            .to_create
            .iter()
            .map(PlannedOp::Create)
            .chain(plan.to_drop.iter().map(|name| PlannedOp::Drop(name)))
            .collect();

        for (position, op) in ops.iter().enumerate() {
            if self.cancel.is_cancelled() {
                let remaining = &ops[position..];
                result
                    .skipped
                    .extend(remaining.iter().map(|op| op.name().to_string()));
                self.sink.record(&SyncEvent::Cancelled {
                    collection,
                    skipped: remaining.len(),
                });
                break;
            }

            match op {
                PlannedOp::Create(spec) => self.apply_create(collection, spec, result),
                PlannedOp::Drop(name) => self.apply_drop(collection, name, result),
            }
        }

        result.advance(result.settled_state());
        self.sink.record(&SyncEvent::RunFinish {
            collection,
            state: result.state,
            applied: result.applied.len(),
            failed: result.failed.len(),
        });
    }

    fn apply_create(
        &self,
        collection: &str,
        spec: &IndexSpec,
        result: &mut SynchronizationResult,
    ) {
        let name = spec.name();

        match self
            .driver
            .create_index(collection, spec.key(), name, self.options.timeout)
        {
            Ok(()) => {
                self.sink.record(&SyncEvent::CreateApplied {
                    collection,
                    index: name,
                    already_present: false,
                });
                result.applied.insert(name.to_string());
            }
            Err(err) if err.kind == StoreErrorKind::AlreadyExists => {
                self.sink.record(&SyncEvent::CreateApplied {
                    collection,
                    index: name,
                    already_present: true,
                });
                result.applied.insert(name.to_string());
            }
            Err(err) => {
                let error =
                    StoreOperationError::from_driver(StoreOp::Create, collection, Some(name), err);
                self.sink.record(&SyncEvent::CreateFailed {
                    collection,
                    error: &error,
                });
                result.failed.insert(name.to_string(), error);
            }
        }
    }

    fn apply_drop(&self, collection: &str, name: &str, result: &mut SynchronizationResult) {
        match self
            .driver
            .drop_index(collection, name, self.options.timeout)
        {
            Ok(()) => {
                self.sink.record(&SyncEvent::DropApplied {
                    collection,
                    index: name,
                });
                result.applied.insert(name.to_string());
            }
            Err(err) if err.kind == StoreErrorKind::NotFound => {
                let warning = StaleStateWarning {
                    collection: collection.to_string(),
                    index: name.to_string(),
                };
                self.sink.record(&SyncEvent::StaleDrop {
                    collection,
                    warning: &warning,
                });
                result.applied.insert(name.to_string());
                result.warnings.push(warning);
            }
            Err(err) => {
                let error =
                    StoreOperationError::from_driver(StoreOp::Drop, collection, Some(name), err);
                self.sink.record(&SyncEvent::DropFailed {
                    collection,
                    error: &error,
                });
                result.failed.insert(name.to_string(), error);
            }
        }
    }
}
