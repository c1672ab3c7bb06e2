//! Metadata nodes as supplied by a metadata source.
//!
//! Nodes are plain data: they are validated when a `RegistryBuilder` is built
//! and resolved into `IndexSpec`s by the resolver. Nothing here touches a
//! store.

mod declaration;
mod persistable;
mod template;

pub use declaration::{IndexDeclaration, RawIndexDeclaration, TemplateRef};
pub use persistable::PersistableType;
pub use template::IndexTemplate;

// Treat an empty order field the same as an absent one.
pub(crate) fn normalize_order_field(order_field: Option<String>) -> Option<String> {
    order_field.filter(|field| !field.is_empty())
}
