use docsync_schema::{
    index::IndexSet,
    node::{IndexDeclaration, PersistableType},
    registry::Registry,
    resolve::resolve_type,
};
use proptest::prelude::*;

const FIELDS: [&str; 5] = ["customerId", "issuedAt", "status", "meta.region", "total"];

fn declaration_strategy() -> impl Strategy<Value = IndexDeclaration> {
    (
        prop::sample::subsequence(FIELDS.to_vec(), 1..=3).prop_shuffle(),
        prop::option::of(prop::sample::select(FIELDS.to_vec())),
    )
        .prop_map(|(fields, order_field)| {
            let decl = IndexDeclaration::new(fields);
            match order_field {
                Some(order_field) => decl.with_order_field(order_field),
                None => decl,
            }
        })
}

fn registry_with(declarations: &[IndexDeclaration]) -> Registry {
    let base = declarations
        .iter()
        .cloned()
        .fold(PersistableType::new("Document", "documents"), PersistableType::index);

    Registry::builder()
        .with_type(base)
        .with_type(PersistableType::new("Invoice", "invoices").extends("Document"))
        .build()
        .expect("generated registry should build")
}

fn resolved(registry: &Registry, name: &str) -> IndexSet {
    resolve_type(registry, name)
        .expect("type should be registered")
        .expect("generated declarations should resolve")
}

proptest! {
    #[test]
    fn resolution_is_deterministic(declarations in prop::collection::vec(declaration_strategy(), 0..6)) {
        let registry = registry_with(&declarations);

        let first: Vec<String> = resolved(&registry, "Document").names().map(str::to_string).collect();
        let second: Vec<String> = resolved(&registry, "Document").names().map(str::to_string).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn declaration_order_does_not_matter(declarations in prop::collection::vec(declaration_strategy(), 0..6)) {
        let mut reversed = declarations.clone();
        reversed.reverse();

        prop_assert_eq!(
            resolved(&registry_with(&declarations), "Document"),
            resolved(&registry_with(&reversed), "Document")
        );
    }

    #[test]
    fn bare_subtype_inherits_supertype_set(declarations in prop::collection::vec(declaration_strategy(), 0..6)) {
        let registry = registry_with(&declarations);

        prop_assert_eq!(resolved(&registry, "Invoice"), resolved(&registry, "Document"));
    }
}
