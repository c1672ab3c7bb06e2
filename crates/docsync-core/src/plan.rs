//! Module: plan
//! Responsibility: diff a resolved `IndexSet` against a live index listing.
//! Does not own: executing the plan (see `sync`).
//! Boundary: pure; the same inputs always yield the same plan.

use crate::{DEFAULT_RESERVED_INDEX, driver::LiveIndex};
use docsync_schema::index::{IndexKey, IndexSet, IndexSpec};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

///
/// ReservedIndexes
///
/// Store-owned index names that are never targeted for removal, whatever the
/// resolved set says.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ReservedIndexes(BTreeSet<String>);

impl ReservedIndexes {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for ReservedIndexes {
    fn default() -> Self {
        Self::new([DEFAULT_RESERVED_INDEX])
    }
}

///
/// NameConflict
///
/// A live index that holds a resolved spec's canonical name under another
/// key. The synchronizer neither creates nor drops it.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NameConflict {
    pub name: String,
    pub live_key: IndexKey,
    pub resolved_key: IndexKey,
}

///
/// ReconciliationPlan
///
/// Store mutations that move one collection from its observed live state to
/// its resolved state. Only meaningful for the listing it was computed from.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ReconciliationPlan {
    pub collection: String,
    pub to_create: BTreeSet<IndexSpec>,
    pub to_drop: BTreeSet<String>,
    pub conflicts: Vec<NameConflict>,
}

impl ReconciliationPlan {
    /// Compute the plan for `collection`.
    ///
    /// A resolved spec is satisfied by a live index with its canonical name
    /// and key, or by any live index with the same key. A live index is
    /// dropped when it is not reserved and satisfies no resolved spec.
    #[must_use]
    pub fn compute(
        collection: &str,
        resolved: &IndexSet,
        live: &[LiveIndex],
        reserved: &ReservedIndexes,
    ) -> Self {
        let live_by_name: BTreeMap<&str, &IndexKey> = live
            .iter()
            .map(|index| (index.name.as_str(), &index.key))
            .collect();
        let live_keys: BTreeSet<&IndexKey> = live.iter().map(|index| &index.key).collect();

        let mut plan = Self {
            collection: collection.to_string(),
            ..Self::default()
        };

        for spec in resolved {
            match live_by_name.get(spec.name()) {
                Some(live_key) if *live_key == spec.key() => {}
                Some(live_key) => plan.conflicts.push(NameConflict {
                    name: spec.name().to_string(),
                    live_key: (*live_key).clone(),
                    resolved_key: spec.key().clone(),
                }),
                None if live_keys.contains(spec.key()) => {}
                None => {
                    plan.to_create.insert(spec.clone());
                }
            }
        }

        for index in live {
            let wanted = resolved.get_by_name(&index.name).is_some()
                || resolved.contains_key(&index.key);

            if !wanted && !reserved.contains(&index.name) {
                plan.to_drop.insert(index.name.clone());
            }
        }

        plan
    }

    /// Whether applying the plan would mutate nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_drop.is_empty()
    }

    /// Number of store mutations the plan issues.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.to_create.len() + self.to_drop.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(paths: &[&str]) -> IndexKey {
        IndexKey::ascending(paths).expect("test key should be valid")
    }

    fn spec(paths: &[&str]) -> IndexSpec {
        IndexSpec::new(key(paths))
    }

    fn live(name: &str, paths: &[&str]) -> LiveIndex {
        LiveIndex::new(name, key(paths))
    }

    fn primary() -> LiveIndex {
        live("_id_", &["_id"])
    }

    #[test]
    fn missing_specs_are_created_and_unmapped_live_indexes_dropped() {
        let resolved: IndexSet = [spec(&["customerId", "issuedAt"]), spec(&["status"])]
            .into_iter()
            .collect();
        let listing = [primary(), live("legacy_status_1", &["legacyStatus"])];

        let plan = ReconciliationPlan::compute(
            "invoices",
            &resolved,
            &listing,
            &ReservedIndexes::default(),
        );

        let creates: Vec<_> = plan.to_create.iter().map(IndexSpec::name).collect();
        assert_eq!(creates, ["customerId_1_issuedAt_1", "status_1"]);
        assert_eq!(plan.to_drop, BTreeSet::from(["legacy_status_1".to_string()]));
        assert!(plan.conflicts.is_empty());
        assert_eq!(plan.operation_count(), 3);
    }

    #[test]
    fn matching_state_yields_empty_plan() {
        let resolved: IndexSet = [spec(&["status"])].into_iter().collect();
        let listing = [primary(), live("status_1", &["status"])];

        let plan = ReconciliationPlan::compute(
            "invoices",
            &resolved,
            &listing,
            &ReservedIndexes::default(),
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn reserved_indexes_are_never_dropped() {
        let listing = [primary(), live("shard_key", &["tenantId"])];
        let reserved = ReservedIndexes::new(["_id_", "shard_key"]);

        let plan = ReconciliationPlan::compute("invoices", &IndexSet::new(), &listing, &reserved);
        assert!(plan.is_empty(), "reserved indexes survive an empty resolved set");
    }

    #[test]
    fn same_key_under_foreign_name_satisfies_spec() {
        let resolved: IndexSet = [spec(&["status"])].into_iter().collect();
        let listing = [primary(), live("by_status", &["status"])];

        let plan = ReconciliationPlan::compute(
            "invoices",
            &resolved,
            &listing,
            &ReservedIndexes::default(),
        );
        assert!(plan.is_empty(), "key equality is the source of truth");
    }

    #[test]
    fn canonical_name_with_other_key_is_a_conflict() {
        let resolved: IndexSet = [spec(&["status"])].into_iter().collect();
        let listing = [primary(), live("status_1", &["status", "createdAt"])];

        let plan = ReconciliationPlan::compute(
            "invoices",
            &resolved,
            &listing,
            &ReservedIndexes::default(),
        );

        assert!(plan.is_empty(), "conflicts are neither created nor dropped");
        assert_eq!(plan.conflicts.len(), 1);
        assert_eq!(plan.conflicts[0].name, "status_1");
        assert_eq!(plan.conflicts[0].live_key, key(&["status", "createdAt"]));
    }
}
