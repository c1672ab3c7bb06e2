use docsync_core::{
    driver::MemoryStore,
    plan::{ReconciliationPlan, ReservedIndexes},
    sync::{SyncOptions, SyncState, Synchronizer},
};
use docsync_schema::index::{IndexKey, IndexSet, IndexSpec};
use proptest::prelude::*;

const COLLECTION: &str = "documents";
const FIELDS: [&str; 5] = ["ownerId", "status", "createdAt", "meta.region", "total"];

fn key_strategy() -> impl Strategy<Value = IndexKey> {
    prop::sample::subsequence(FIELDS.to_vec(), 1..=3)
        .prop_shuffle()
        .prop_map(|paths| IndexKey::ascending(paths).expect("generated key should be valid"))
}

fn resolved_strategy() -> impl Strategy<Value = IndexSet> {
    prop::collection::vec(key_strategy(), 0..5)
        .prop_map(|keys| keys.into_iter().map(IndexSpec::new).collect())
}

// Live indexes either carry their canonical name or a foreign one.
fn store_strategy() -> impl Strategy<Value = MemoryStore> {
    prop::collection::vec((key_strategy(), any::<bool>()), 0..5).prop_map(|live| {
        let store = MemoryStore::new().with_collection(COLLECTION);
        for (position, (key, canonical)) in live.into_iter().enumerate() {
            let name = if canonical {
                key.canonical_name()
            } else {
                format!("legacy_{position}")
            };
            store.insert_index(COLLECTION, &name, key);
        }
        store
    })
}

proptest! {
    #[test]
    fn planning_is_deterministic(resolved in resolved_strategy(), store in store_strategy()) {
        let live = store.indexes(COLLECTION);
        let reserved = ReservedIndexes::default();

        let first = ReconciliationPlan::compute(COLLECTION, &resolved, &live, &reserved);
        let second = ReconciliationPlan::compute(COLLECTION, &resolved, &live, &reserved);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn second_run_plans_nothing(resolved in resolved_strategy(), store in store_strategy()) {
        let sync = Synchronizer::new(&store, SyncOptions::default());

        let first = sync.synchronize(COLLECTION, &resolved).expect("first sync should reach the store");
        prop_assert_ne!(first.state, SyncState::Cancelled);

        let second = sync.plan(COLLECTION, &resolved).expect("plan should reach the store");
        prop_assert!(second.is_empty(), "leftover plan: {:?}", second);
    }

    #[test]
    fn every_planned_name_gets_one_outcome(resolved in resolved_strategy(), store in store_strategy()) {
        let result = Synchronizer::new(&store, SyncOptions::default())
            .synchronize(COLLECTION, &resolved)
            .expect("sync should reach the store");

        let planned = result.plan.operation_count() + result.plan.conflicts.len();
        let outcomes = result.applied.len() + result.failed.len() + result.skipped.len();
        prop_assert_eq!(planned, outcomes);
        prop_assert!(store.index_names(COLLECTION).contains(&"_id_".to_string()));
    }
}
