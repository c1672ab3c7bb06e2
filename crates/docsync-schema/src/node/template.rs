use crate::node::normalize_order_field;
use serde::Serialize;

///
/// IndexTemplate
///
/// Named, reusable index shape. A template with no fields carries only an
/// order field and means nothing until a `TemplateRef` supplies the fields.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct IndexTemplate {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_field: Option<String>,
}

impl IndexTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            order_field: None,
        }
    }

    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
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
