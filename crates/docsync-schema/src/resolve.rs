//! Module: resolve
//! Responsibility: turn a type's raw declarations into a canonical `IndexSet`.
//! Does not own: registry validation or any store interaction.
//! Boundary: pure computation over a built `Registry`; never performs I/O.
//!
//! Collection order per type: inherited declarations (root-most supertype
//! first), then direct declarations on the type, then template
//! instantiations. Output is a set, so this order only decides which
//! malformed declaration is reported first.

use crate::{
    error::{ConfigProblem, ConfigurationError, InvalidFieldPathError, ResolveError},
    index::{IndexKey, IndexKeyError, IndexSet, IndexSpec, KeyPart},
    node::{IndexDeclaration, PersistableType, TemplateRef},
    path::{FieldPath, FieldPathFault},
    registry::{Registry, TypeId},
};
use std::collections::BTreeMap;

///
/// EffectiveDeclaration
///
/// A declaration after template instantiation: the field list and order
/// field that actually feed the key.
///

struct EffectiveDeclaration<'a> {
    declared_on: &'a str,
    fields: &'a [String],
    order_field: Option<&'a str>,
}

impl<'a> EffectiveDeclaration<'a> {
    fn direct(declared_on: &'a str, decl: &'a IndexDeclaration) -> Self {
        Self {
            declared_on,
            fields: &decl.fields,
            order_field: decl.order_field(),
        }
    }

    fn instantiate(
        registry: &'a Registry,
        declared_on: &'a str,
        use_site: &'a TemplateRef,
    ) -> Result<Self, ConfigurationError> {
        let template = registry.template(&use_site.template).ok_or_else(|| {
            ConfigurationError::single(ConfigProblem::UnknownTemplate {
                type_name: declared_on.to_string(),
                template: use_site.template.clone(),
            })
        })?;

        let fields = if use_site.fields.is_empty() {
            &template.fields
        } else {
            &use_site.fields
        };

        Ok(Self {
            declared_on,
            fields,
            order_field: use_site.order_field().or_else(|| template.order_field()),
        })
    }
}

/// Resolve the full index set of one type.
///
/// Any malformed declaration fails the whole type: a partial set is never
/// returned.
pub fn resolve(registry: &Registry, id: TypeId) -> Result<IndexSet, ResolveError> {
    let type_name = registry
        .get(id)
        .ok_or_else(|| {
            ConfigurationError::single(ConfigProblem::ForeignTypeId { index: id.index() })
        })?
        .name
        .as_str();
    let mut set = IndexSet::new();

    for def in registry
        .lineage(id)
        .into_iter()
        .filter_map(|ancestor| registry.get(ancestor))
    {
        for decl in collect(registry, def)? {
            if decl.fields.is_empty() {
                tracing::debug!(
                    type_name,
                    declared_on = decl.declared_on,
                    "skipping index declaration without fields"
                );
                continue;
            }

            let spec = IndexSpec::new(build_key(type_name, &decl)?);
            if let Some(existing) = set.get_by_name(spec.name())
                && existing.key() != spec.key()
            {
                return Err(ConfigurationError::single(ConfigProblem::CanonicalNameCollision {
                    type_name: type_name.to_string(),
                    name: spec.name().to_string(),
                    first: existing.key().to_string(),
                    second: spec.key().to_string(),
                })
                .into());
            }
            if !set.insert(spec) {
                tracing::debug!(
                    type_name,
                    declared_on = decl.declared_on,
                    "collapsed index declaration with an already resolved key"
                );
            }
        }
    }

    Ok(set)
}

/// Resolve a type by name.
pub fn resolve_type(registry: &Registry, name: &str) -> Option<Result<IndexSet, ResolveError>> {
    registry.type_id(name).map(|id| resolve(registry, id))
}

/// Resolve every type, keyed by collection. One type failing never stops the
/// others from resolving.
#[must_use]
pub fn resolve_all(registry: &Registry) -> BTreeMap<String, Result<IndexSet, ResolveError>> {
    registry
        .iter()
        .map(|(id, def)| (def.collection.clone(), resolve(registry, id)))
        .collect()
}

// Direct declarations first, then template instantiations.
fn collect<'a>(
    registry: &'a Registry,
    def: &'a PersistableType,
) -> Result<Vec<EffectiveDeclaration<'a>>, ConfigurationError> {
    let mut out: Vec<_> = def
        .direct_declarations()
        .map(|decl| EffectiveDeclaration::direct(&def.name, decl))
        .collect();

    for use_site in def.template_refs() {
        out.push(EffectiveDeclaration::instantiate(registry, &def.name, use_site)?);
    }

    Ok(out)
}

// Declared fields in order, then the order field when it is not already part
// of the key.
fn build_key(type_name: &str, decl: &EffectiveDeclaration<'_>) -> Result<IndexKey, ResolveError> {
    let invalid = |path: &str, fault: FieldPathFault| -> ResolveError {
        InvalidFieldPathError {
            type_name: type_name.to_string(),
            declared_on: decl.declared_on.to_string(),
            path: path.to_string(),
            fault,
        }
        .into()
    };
    let key_error = |err: IndexKeyError| match err {
        IndexKeyError::Empty => invalid("", FieldPathFault::Empty),
        IndexKeyError::InvalidPath { path, fault } => invalid(&path, fault),
    };

    let parts = decl
        .fields
        .iter()
        .map(|raw| {
            FieldPath::parse(raw)
                .map(KeyPart::asc)
                .map_err(|fault| invalid(raw, fault))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let key = IndexKey::new(parts).map_err(key_error)?;

    let Some(raw) = decl.order_field else {
        return Ok(key);
    };
    let path = FieldPath::parse(raw).map_err(|fault| invalid(raw, fault))?;
    if key.contains_path(&path) {
        return Ok(key);
    }

    let mut parts = key.parts().to_vec();
    parts.push(KeyPart::asc(path));

    IndexKey::new(parts).map_err(key_error)
}
