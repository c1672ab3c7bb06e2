use crate::node::{IndexDeclaration, RawIndexDeclaration, TemplateRef};
use serde::Serialize;

///
/// PersistableType
///
/// A type persisted as one collection, with the index declarations written on
/// it and an optional supertype whose declarations it inherits.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PersistableType {
    /// Type identifier, unique within a registry.
    pub name: String,

    /// Target collection, unique within a registry.
    pub collection: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub declarations: Vec<RawIndexDeclaration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertype: Option<String>,
}

impl PersistableType {
    pub fn new(name: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection: collection.into(),
            declarations: Vec::new(),
            supertype: None,
        }
    }

    #[must_use]
    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    #[must_use]
    pub fn index(mut self, decl: IndexDeclaration) -> Self {
        self.declarations.push(RawIndexDeclaration::Direct(decl));
        self
    }

    #[must_use]
    pub fn template(mut self, template: TemplateRef) -> Self {
        self.declarations.push(RawIndexDeclaration::Template(template));
        self
    }

    #[must_use]
    pub fn declare(mut self, decl: impl Into<RawIndexDeclaration>) -> Self {
        self.declarations.push(decl.into());
        self
    }

    /// Direct declarations, in declared order.
    pub fn direct_declarations(&self) -> impl Iterator<Item = &IndexDeclaration> {
        self.declarations.iter().filter_map(|decl| match decl {
            RawIndexDeclaration::Direct(decl) => Some(decl),
            RawIndexDeclaration::Template(_) => None,
        })
    }

    /// Template instantiations, in declared order.
    pub fn template_refs(&self) -> impl Iterator<Item = &TemplateRef> {
        self.declarations.iter().filter_map(|decl| match decl {
            RawIndexDeclaration::Template(template) => Some(template),
            RawIndexDeclaration::Direct(_) => None,
        })
    }
}
