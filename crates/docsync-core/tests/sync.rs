use docsync_core::{
    driver::{Fault, IndexStoreDriver, MemoryStore, StoreCall, StoreErrorKind},
    error::{ErrorClass, ErrorOrigin, SyncError},
    obs::{CountingSink, SyncEvent, SyncSink},
    plan::ReservedIndexes,
    sync::{CancelFlag, SyncOptions, SyncState, Synchronizer},
};
use docsync_schema::{
    index::{IndexKey, IndexSet, IndexSpec},
    node::{IndexDeclaration, PersistableType},
    registry::Registry,
};
use std::{sync::Arc, thread, time::Duration};

const INVOICES: &str = "invoices";

fn key(paths: &[&str]) -> IndexKey {
    IndexKey::ascending(paths).expect("test key should be valid")
}

fn resolved(keys: &[&[&str]]) -> IndexSet {
    keys.iter().map(|paths| IndexSpec::new(key(paths))).collect()
}

fn invoice_set() -> IndexSet {
    resolved(&[&["customerId", "issuedAt"], &["status"]])
}

fn legacy_store() -> MemoryStore {
    MemoryStore::new().with_index(INVOICES, "legacy_status_1", key(&["legacyStatus"]))
}

fn synchronizer(store: &MemoryStore) -> Synchronizer<&MemoryStore> {
    Synchronizer::new(store, SyncOptions::default())
}

///
/// CancelOnCreate
/// Raises the cancel flag as soon as any create lands.
///

struct CancelOnCreate(CancelFlag);

impl SyncSink for CancelOnCreate {
    fn record(&self, event: &SyncEvent<'_>) {
        if matches!(event, SyncEvent::CreateApplied { .. }) {
            self.0.cancel();
        }
    }
}

#[test]
fn unmapped_live_index_is_dropped_and_missing_specs_created() {
    let store = legacy_store();
    let result = synchronizer(&store)
        .synchronize(INVOICES, &invoice_set())
        .expect("sync should reach the store");

    assert_eq!(result.state, SyncState::Completed);
    assert_eq!(
        store.index_names(INVOICES),
        ["_id_", "customerId_1_issuedAt_1", "status_1"]
    );
    assert!(result.applied.contains("legacy_status_1"));
    assert!(result.failed.is_empty());
}

#[test]
fn creates_are_issued_before_drops() {
    let store = legacy_store();
    let _ = synchronizer(&store)
        .synchronize(INVOICES, &invoice_set())
        .expect("sync should reach the store");

    let calls = store.calls();
    let first_drop = calls
        .iter()
        .position(|call| matches!(call, StoreCall::Drop { .. }))
        .expect("a drop should have been issued");
    let last_create = calls
        .iter()
        .rposition(|call| matches!(call, StoreCall::Create { .. }))
        .expect("a create should have been issued");

    assert!(matches!(calls[0], StoreCall::List { .. }));
    assert!(last_create < first_drop, "all creates precede any drop");
}

#[test]
fn second_run_is_a_noop() {
    let store = legacy_store();
    let sync = synchronizer(&store);

    let _ = sync
        .synchronize(INVOICES, &invoice_set())
        .expect("first sync should reach the store");
    store.clear_calls();

    let second = sync
        .synchronize(INVOICES, &invoice_set())
        .expect("second sync should reach the store");

    assert!(second.is_noop());
    assert!(second.is_success());
    assert_eq!(store.calls().len(), 1, "only the listing is issued");
}

#[test]
fn interrupted_run_resumes_with_drops_only() {
    let store = legacy_store();
    let cancel = CancelFlag::new();
    let sync = synchronizer(&store)
        .with_cancel_flag(cancel.clone())
        .with_sink(Arc::new(CancelOnCreate(cancel.clone())));

    let interrupted = sync
        .synchronize(INVOICES, &resolved(&[&["status"]]))
        .expect("sync should reach the store");

    assert_eq!(interrupted.state, SyncState::Cancelled);
    assert!(interrupted.applied.contains("status_1"));
    assert!(interrupted.skipped.contains("legacy_status_1"));
    assert!(store.index_names(INVOICES).contains(&"legacy_status_1".to_string()));

    cancel.reset();
    let plan = synchronizer(&store)
        .plan(INVOICES, &resolved(&[&["status"]]))
        .expect("plan should reach the store");

    assert!(plan.to_create.is_empty(), "creates already landed");
    assert_eq!(plan.to_drop.len(), 1);
}

#[test]
fn one_failing_create_does_not_block_the_rest() {
    let store = legacy_store();
    store.inject(Fault::Create {
        name: "status_1".to_string(),
        kind: StoreErrorKind::Unavailable,
    });

    let result = synchronizer(&store)
        .synchronize(INVOICES, &invoice_set())
        .expect("sync should reach the store");

    assert_eq!(result.state, SyncState::PartiallyFailed);
    assert!(result.applied.contains("customerId_1_issuedAt_1"));
    assert!(result.applied.contains("legacy_status_1"));

    let err = result
        .error_for("status_1")
        .expect("failed create should be recorded");
    assert_eq!(err.class(), ErrorClass::Unavailable);
    assert_eq!(err.index.as_deref(), Some("status_1"));
}

#[test]
fn vanished_drop_target_is_a_warning() {
    let store = legacy_store();
    store.inject(Fault::ConcurrentDrop {
        name: "legacy_status_1".to_string(),
    });

    let result = synchronizer(&store)
        .synchronize(INVOICES, &invoice_set())
        .expect("sync should reach the store");

    assert_eq!(result.state, SyncState::Completed);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].index, "legacy_status_1");
    assert!(result.applied.contains("legacy_status_1"));
}

#[test]
fn concurrently_created_index_counts_as_applied() {
    let store = MemoryStore::new();
    store.inject(Fault::ConcurrentCreate {
        name: "status_1".to_string(),
    });

    let result = synchronizer(&store)
        .synchronize(INVOICES, &resolved(&[&["status"]]))
        .expect("sync should reach the store");

    assert!(result.is_success());
    assert!(result.applied.contains("status_1"));
}

#[test]
fn name_conflict_is_reported_and_left_untouched() {
    let store = MemoryStore::new().with_index(INVOICES, "status_1", key(&["status", "region"]));

    let result = synchronizer(&store)
        .synchronize(INVOICES, &resolved(&[&["status"]]))
        .expect("sync should reach the store");

    assert_eq!(result.state, SyncState::PartiallyFailed);
    let err = result
        .error_for("status_1")
        .expect("conflict should be recorded as a failure");
    assert_eq!(err.class(), ErrorClass::Conflict);

    let live = store.indexes(INVOICES);
    let status = live
        .iter()
        .find(|index| index.name == "status_1")
        .expect("conflicting index should survive");
    assert_eq!(status.key, key(&["status", "region"]));
}

#[test]
fn listing_timeout_fails_the_run() {
    let store = MemoryStore::new();
    store.inject(Fault::Latency(Duration::from_millis(50)));

    let sync = Synchronizer::new(
        &store,
        SyncOptions::default().with_timeout(Duration::from_millis(5)),
    );
    let err = sync
        .synchronize(INVOICES, &invoice_set())
        .expect_err("listing should time out");

    assert!(matches!(err, SyncError::Fetch(_)));
    assert_eq!(err.class(), ErrorClass::Timeout);
    assert_eq!(err.origin(), ErrorOrigin::Store);
}

#[test]
fn create_timeout_is_recorded_per_index() {
    let store = MemoryStore::new().with_collection(INVOICES);
    store.inject(Fault::Create {
        name: "status_1".to_string(),
        kind: StoreErrorKind::Timeout,
    });

    let result = synchronizer(&store)
        .synchronize(INVOICES, &invoice_set())
        .expect("sync should reach the store");

    assert_eq!(result.failed.len(), 1);
    assert_eq!(
        result.failed["status_1"].class(),
        ErrorClass::Timeout,
        "timeouts are per-name failures"
    );
    assert!(result.applied.contains("customerId_1_issuedAt_1"));
}

#[test]
fn reserved_indexes_survive_an_empty_resolved_set() {
    let store = legacy_store().with_index(INVOICES, "shard_tenant", key(&["tenantId"]));
    let options = SyncOptions::default().with_reserved(ReservedIndexes::new(["_id_", "shard_tenant"]));

    let result = Synchronizer::new(&store, options)
        .synchronize(INVOICES, &IndexSet::new())
        .expect("sync should reach the store");

    assert_eq!(result.state, SyncState::Completed);
    assert_eq!(store.index_names(INVOICES), ["_id_", "shard_tenant"]);
}

#[test]
fn concurrent_synchronizers_converge() {
    let store = Arc::new(legacy_store());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                Synchronizer::new(store, SyncOptions::default())
                    .synchronize(INVOICES, &invoice_set())
                    .expect("sync should reach the store")
            })
        })
        .collect();

    for handle in handles {
        let result = handle.join().expect("sync thread should not panic");
        assert!(result.failed.is_empty(), "races resolve to success");
    }

    assert_eq!(
        store.index_names(INVOICES),
        ["_id_", "customerId_1_issuedAt_1", "status_1"]
    );
}

#[test]
fn synchronize_all_isolates_resolution_failures() {
    let registry = Registry::builder()
        .with_type(
            PersistableType::new("Invoice", INVOICES)
                .index(IndexDeclaration::new(["customerId", "issuedAt"])),
        )
        .with_type(PersistableType::new("Broken", "broken").index(IndexDeclaration::new([""])))
        .build()
        .expect("registry should build");
    let store = MemoryStore::new();
    let counters = Arc::new(CountingSink::new());

    let outcomes = synchronizer(&store)
        .with_sink(counters.clone())
        .synchronize_all(&registry);

    assert!(matches!(outcomes["broken"], Err(SyncError::Resolve(_))));
    let invoices = outcomes[INVOICES]
        .as_ref()
        .expect("invoices should synchronize");
    assert!(invoices.applied.contains("customerId_1_issuedAt_1"));

    let snapshot = counters.snapshot();
    assert_eq!(snapshot.runs, 1, "a type that fails to resolve never starts a run");
    assert_eq!(snapshot.creates, 1);
}

#[test]
fn colliding_canonical_names_never_reach_the_store() {
    let registry = Registry::builder()
        .with_type(
            PersistableType::new("Ledger", "ledgers")
                .index(IndexDeclaration::new(["a_1_b"]))
                .index(IndexDeclaration::new(["a", "b"])),
        )
        .build()
        .expect("registry should build");
    let store = MemoryStore::new().with_collection("ledgers");
    let sync = synchronizer(&store);

    for _ in 0..2 {
        let outcomes = sync.synchronize_all(&registry);
        let err = outcomes["ledgers"]
            .as_ref()
            .expect_err("colliding names should fail resolution");
        assert_eq!(err.class(), ErrorClass::Configuration);
        assert_eq!(err.origin(), ErrorOrigin::Resolve);
    }

    assert_eq!(store.index_names("ledgers"), ["_id_"]);
    assert!(
        store
            .calls()
            .iter()
            .all(|call| !matches!(call, StoreCall::Create { .. })),
        "no create is issued for an ambiguous name"
    );
}

#[test]
fn plan_is_a_dry_run() {
    let store = legacy_store();
    let plan = synchronizer(&store)
        .plan(INVOICES, &invoice_set())
        .expect("plan should reach the store");

    assert_eq!(plan.operation_count(), 3);
    assert_eq!(store.index_names(INVOICES), ["_id_", "legacy_status_1"]);
    assert!(
        store
            .list_indexes(INVOICES, Duration::from_secs(1))
            .expect("listing should succeed")
            .iter()
            .all(|index| index.name != "status_1")
    );
}

#[test]
fn result_serializes_for_reports() {
    let store = legacy_store();
    let result = synchronizer(&store)
        .synchronize(INVOICES, &invoice_set())
        .expect("sync should reach the store");

    let json = serde_json::to_value(&result).expect("result should serialize");
    assert_eq!(json["state"], "Completed");
    assert_eq!(json["collection"], INVOICES);
    assert_eq!(json["plan"]["to_drop"][0], "legacy_status_1");
}
