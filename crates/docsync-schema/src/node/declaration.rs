use crate::node::normalize_order_field;
use serde::Serialize;

///
/// IndexDeclaration
///
/// An index written directly on a type: ordered fields plus an optional
/// order field appended to the key for sorted range scans.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct IndexDeclaration {
    pub fields: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_field: Option<String>,
}

impl IndexDeclaration {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            order_field: None,
        }
    }

    #[must_use]
    pub fn with_order_field(mut self, order_field: impl Into<String>) -> Self {
        self.order_field = normalize_order_field(Some(order_field.into()));
        self
    }

    #[must_use]
    pub fn order_field(&self) -> Option<&str> {
        self.order_field.as_deref().filter(|field| !field.is_empty())
    }
}

///
/// TemplateRef
///
/// Use-site of a named `IndexTemplate`. Non-empty `fields` replace the
/// template's field list; a present `order_field` overrides the template's.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct TemplateRef {
    pub template: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_field: Option<String>,
}

impl TemplateRef {
    pub fn new<I, S>(template: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            template: template.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            order_field: None,
        }
    }

    #[must_use]
    pub fn with_order_field(mut self, order_field: impl Into<String>) -> Self {
        self.order_field = normalize_order_field(Some(order_field.into()));
        self
    }

    #[must_use]
    pub fn order_field(&self) -> Option<&str> {
        self.order_field.as_deref().filter(|field| !field.is_empty())
    }
}

///
/// RawIndexDeclaration
///
/// One index declaration attached to a persistable type, either written out
/// in full or instantiated from a template.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum RawIndexDeclaration {
    Direct(IndexDeclaration),
    Template(TemplateRef),
}

impl RawIndexDeclaration {
    #[must_use]
    pub const fn is_template(&self) -> bool {
        matches!(self, Self::Template(_))
    }
}

impl From<IndexDeclaration> for RawIndexDeclaration {
    fn from(decl: IndexDeclaration) -> Self {
        Self::Direct(decl)
    }
}

impl From<TemplateRef> for RawIndexDeclaration {
    fn from(template: TemplateRef) -> Self {
        Self::Template(template)
    }
}
