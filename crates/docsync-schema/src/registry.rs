//! Module: registry
//! Responsibility: validated, read-only arena of persistable types and templates.
//! Does not own: index resolution (see `resolve`).
//! Boundary: metadata sources feed a `RegistryBuilder`; everything downstream
//! reads a built `Registry` by reference.

use crate::{
    error::{ConfigProblem, ConfigurationError},
    node::{IndexTemplate, PersistableType, RawIndexDeclaration},
};
use std::{
    collections::{BTreeMap, HashMap},
    iter,
};

///
/// TypeId
///
/// Arena index of a type inside one `Registry`.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TypeId(usize);

impl TypeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

///
/// TypeNode
///
/// A registered type plus its resolved parent link.
///

#[derive(Clone, Debug)]
pub struct TypeNode {
    pub def: PersistableType,
    pub parent: Option<TypeId>,
}

///
/// RegistryBuilder
///
/// Initialization phase. Collects nodes in any order; supertypes may be
/// registered after their subtypes.
///

#[derive(Clone, Debug, Default)]
pub struct RegistryBuilder {
    types: Vec<PersistableType>,
    templates: Vec<IndexTemplate>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_type(&mut self, def: PersistableType) -> &mut Self {
        self.types.push(def);
        self
    }

    pub fn register_template(&mut self, template: IndexTemplate) -> &mut Self {
        self.templates.push(template);
        self
    }

    #[must_use]
    pub fn with_type(mut self, def: PersistableType) -> Self {
        self.types.push(def);
        self
    }

    #[must_use]
    pub fn with_template(mut self, template: IndexTemplate) -> Self {
        self.templates.push(template);
        self
    }

    /// Validate everything collected and freeze it into a `Registry`.
    /// Every problem found is reported, not just the first.
    pub fn build(self) -> Result<Registry, ConfigurationError> {
        let mut problems = Vec::new();

        // templates
        let mut templates = BTreeMap::new();
        for template in self.templates {
            if template.name.is_empty() {
                problems.push(ConfigProblem::EmptyTemplateName);
                continue;
            }
            if templates.contains_key(&template.name) {
                problems.push(ConfigProblem::DuplicateTemplateName {
                    name: template.name.clone(),
                });
                continue;
            }
            templates.insert(template.name.clone(), template);
        }

        // names and collections
        let mut by_name: HashMap<String, TypeId> = HashMap::new();
        let mut by_collection: BTreeMap<String, TypeId> = BTreeMap::new();
        for (idx, def) in self.types.iter().enumerate() {
            let id = TypeId(idx);

            if def.name.is_empty() {
                problems.push(ConfigProblem::EmptyTypeName {
                    collection: def.collection.clone(),
                });
            } else if by_name.insert(def.name.clone(), id).is_some() {
                problems.push(ConfigProblem::DuplicateTypeName {
                    name: def.name.clone(),
                });
            }

            if def.collection.is_empty() {
                problems.push(ConfigProblem::EmptyCollectionName {
                    type_name: def.name.clone(),
                });
            } else if let Some(prev) = by_collection.get(&def.collection) {
                problems.push(ConfigProblem::DuplicateCollectionName {
                    collection: def.collection.clone(),
                    first: self.types[prev.0].name.clone(),
                    second: def.name.clone(),
                });
            } else {
                by_collection.insert(def.collection.clone(), id);
            }

            for decl in &def.declarations {
                if let RawIndexDeclaration::Template(template) = decl
                    && !templates.contains_key(&template.template)
                {
                    problems.push(ConfigProblem::UnknownTemplate {
                        type_name: def.name.clone(),
                        template: template.template.clone(),
                    });
                }
            }
        }

        // parent links
        let mut nodes = Vec::with_capacity(self.types.len());
        for def in self.types {
            let parent = match &def.supertype {
                None => None,
                Some(supertype) => {
                    let parent = by_name.get(supertype).copied();
                    if parent.is_none() {
                        problems.push(ConfigProblem::UnknownSupertype {
                            type_name: def.name.clone(),
                            supertype: supertype.clone(),
                        });
                    }
                    parent
                }
            };

            nodes.push(TypeNode { def, parent });
        }

        // cycles
        for (idx, node) in nodes.iter().enumerate() {
            if on_cycle(&nodes, TypeId(idx)) {
                problems.push(ConfigProblem::SupertypeCycle {
                    type_name: node.def.name.clone(),
                });
            }
        }

        if !problems.is_empty() {
            return Err(ConfigurationError::new(problems));
        }

        Ok(Registry {
            nodes,
            by_name,
            by_collection,
            templates,
        })
    }
}

// A type is on a cycle when walking its parent chain leads back to itself.
// Types that merely extend a cycle are caught through their ancestors.
fn on_cycle(nodes: &[TypeNode], start: TypeId) -> bool {
    let mut current = nodes[start.0].parent;
    let mut steps = 0;

    while let Some(id) = current {
        if id == start {
            return true;
        }
        steps += 1;
        if steps > nodes.len() {
            return false;
        }
        current = nodes[id.0].parent;
    }

    false
}

///
/// Registry
///
/// Read phase. Immutable arena of types with parent links, plus templates.
///

#[derive(Clone, Debug)]
pub struct Registry {
    nodes: Vec<TypeNode>,
    by_name: HashMap<String, TypeId>,
    by_collection: BTreeMap<String, TypeId>,
    templates: BTreeMap<String, IndexTemplate>,
}

impl Registry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node; `None` for an id minted by another registry.
    #[must_use]
    pub fn node(&self, id: TypeId) -> Option<&TypeNode> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn get(&self, id: TypeId) -> Option<&PersistableType> {
        self.nodes.get(id.0).map(|node| &node.def)
    }

    #[must_use]
    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn type_for_collection(&self, collection: &str) -> Option<TypeId> {
        self.by_collection.get(collection).copied()
    }

    #[must_use]
    pub fn template(&self, name: &str) -> Option<&IndexTemplate> {
        self.templates.get(name)
    }

    /// Iterate types in collection-name order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &PersistableType)> {
        self.by_collection
            .values()
            .filter_map(|id| self.get(*id).map(|def| (*id, def)))
    }

    /// Collection names in sorted order.
    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.by_collection.keys().map(String::as_str)
    }

    /// The type followed by its supertypes, ordered root-most first. Empty
    /// for an id minted by another registry.
    #[must_use]
    pub fn lineage(&self, id: TypeId) -> Vec<TypeId> {
        // acyclic by construction
        let mut chain: Vec<_> = iter::successors(self.node(id).map(|_| id), |current| {
            self.node(*current).and_then(|node| node.parent)
        })
        .collect();

        chain.reverse();
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{IndexDeclaration, TemplateRef};

    fn invoice() -> PersistableType {
        PersistableType::new("Invoice", "invoices")
            .index(IndexDeclaration::new(["customerId", "issuedAt"]))
    }

    #[test]
    fn build_links_supertypes_declared_out_of_order() {
        let registry = Registry::builder()
            .with_type(PersistableType::new("CreditNote", "credit_notes").extends("Invoice"))
            .with_type(invoice())
            .build()
            .expect("registry should build");

        let note = registry
            .type_id("CreditNote")
            .expect("subtype should be registered");
        let parent = registry
            .node(note)
            .and_then(|node| node.parent)
            .expect("subtype should link parent");
        assert_eq!(
            registry.get(parent).map(|def| def.name.as_str()),
            Some("Invoice")
        );

        let lineage = registry.lineage(note);
        assert_eq!(lineage.len(), 2);
        assert_eq!(lineage[0], parent, "lineage is ordered root-most first");
        assert_eq!(lineage[1], note);
    }

    #[test]
    fn ids_from_another_registry_resolve_to_nothing() {
        let larger = Registry::builder()
            .with_type(invoice())
            .with_type(PersistableType::new("CreditNote", "credit_notes").extends("Invoice"))
            .build()
            .expect("registry should build");
        let smaller = Registry::builder()
            .with_type(invoice())
            .build()
            .expect("registry should build");

        let foreign = larger
            .type_id("Invoice")
            .into_iter()
            .chain(larger.type_id("CreditNote"))
            .max()
            .expect("larger registry should mint ids");

        assert!(smaller.node(foreign).is_none());
        assert!(smaller.get(foreign).is_none());
        assert!(smaller.lineage(foreign).is_empty());
    }

    #[test]
    fn empty_and_duplicate_collections_are_rejected() {
        let err = Registry::builder()
            .with_type(invoice())
            .with_type(PersistableType::new("InvoiceCopy", "invoices"))
            .with_type(PersistableType::new("Draft", ""))
            .build()
            .expect_err("collection conflicts should fail the build");

        assert!(err.contains(&ConfigProblem::DuplicateCollectionName {
            collection: "invoices".to_string(),
            first: "Invoice".to_string(),
            second: "InvoiceCopy".to_string(),
        }));
        assert!(err.contains(&ConfigProblem::EmptyCollectionName {
            type_name: "Draft".to_string(),
        }));
        assert_eq!(err.problems.len(), 2, "all problems should be reported");
    }

    #[test]
    fn duplicate_type_names_are_rejected() {
        let err = Registry::builder()
            .with_type(invoice())
            .with_type(PersistableType::new("Invoice", "invoices_v2"))
            .build()
            .expect_err("duplicate type names should fail");

        assert_eq!(
            err.problems,
            vec![ConfigProblem::DuplicateTypeName {
                name: "Invoice".to_string(),
            }]
        );
    }

    #[test]
    fn unknown_supertype_and_template_are_rejected() {
        let err = Registry::builder()
            .with_type(
                PersistableType::new("Invoice", "invoices")
                    .extends("Document")
                    .template(TemplateRef::new("timeline", ["ownerId"])),
            )
            .build()
            .expect_err("dangling references should fail");

        assert!(err.contains(&ConfigProblem::UnknownSupertype {
            type_name: "Invoice".to_string(),
            supertype: "Document".to_string(),
        }));
        assert!(err.contains(&ConfigProblem::UnknownTemplate {
            type_name: "Invoice".to_string(),
            template: "timeline".to_string(),
        }));
    }

    #[test]
    fn supertype_cycles_are_rejected() {
        let err = Registry::builder()
            .with_type(PersistableType::new("A", "a").extends("B"))
            .with_type(PersistableType::new("B", "b").extends("A"))
            .with_type(PersistableType::new("C", "c").extends("A"))
            .build()
            .expect_err("cycle should fail the build");

        let cyclic: Vec<_> = err
            .problems
            .iter()
            .filter_map(|problem| match problem {
                ConfigProblem::SupertypeCycle { type_name } => Some(type_name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(cyclic, ["A", "B"], "only types on the cycle itself are named");
    }

    #[test]
    fn duplicate_templates_are_rejected() {
        let err = Registry::builder()
            .with_template(IndexTemplate::new("timeline").with_order_field("createdAt"))
            .with_template(IndexTemplate::new("timeline"))
            .with_template(IndexTemplate::new(""))
            .build()
            .expect_err("template conflicts should fail");

        assert!(err.contains(&ConfigProblem::DuplicateTemplateName {
            name: "timeline".to_string(),
        }));
        assert!(err.contains(&ConfigProblem::EmptyTemplateName));
    }

    #[test]
    fn iteration_follows_collection_order() {
        let registry = Registry::builder()
            .with_type(PersistableType::new("Order", "orders"))
            .with_type(invoice())
            .build()
            .expect("registry should build");

        let collections: Vec<_> = registry.collections().collect();
        assert_eq!(collections, ["invoices", "orders"]);
        assert_eq!(
            registry
                .type_for_collection("orders")
                .and_then(|id| registry.get(id))
                .map(|def| def.name.as_str()),
            Some("Order")
        );
    }
}
