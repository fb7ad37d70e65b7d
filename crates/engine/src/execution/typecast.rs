use schema::{Schema, Type, TypeDefinition, TypeDefinitionId};
use serde_json::Value;

use super::Scope;

/// Concrete object type of a value of an abstract type. Names that are not a possible object
/// type of `abstract_type` are kept for error reporting.
pub(crate) fn resolve_type(scope: &Scope<'_>, abstract_type: TypeDefinitionId, value: &Value) -> ResolvedType {
    match scope.resolvers.resolve_type_name(abstract_type, value) {
        Some(name) => match scope.schema.type_by_name(&name) {
            Some(id)
                if scope.schema[id].is_object()
                    && is_subtype(scope.schema, &Type::Named(id), &Type::Named(abstract_type)) =>
            {
                ResolvedType::Object(id)
            }
            _ => ResolvedType::NotPossible(name),
        },
        None => ResolvedType::Unknown,
    }
}

pub(crate) enum ResolvedType {
    Object(TypeDefinitionId),
    NotPossible(String),
    Unknown,
}

impl ResolvedType {
    pub fn object_id(&self) -> Option<TypeDefinitionId> {
        match self {
            ResolvedType::Object(id) => Some(*id),
            _ => None,
        }
    }
}

/// Whether selections under `candidate` apply to a value of type `current`.
pub(crate) fn compatible(scope: &Scope<'_>, current: TypeDefinitionId, candidate: TypeDefinitionId, value: &Value) -> bool {
    if current == candidate {
        return true;
    }
    let schema = scope.schema;
    if schema[current].is_abstract() {
        return resolve_type(scope, current, value)
            .object_id()
            .is_some_and(|object_id| schema.is_possible_type(candidate, object_id));
    }
    match &schema[candidate] {
        TypeDefinition::Union(union) => union.possible_types.contains(&current),
        TypeDefinition::Interface(_) => schema.implements(current, candidate),
        _ => false,
    }
}

/// Whether a value of type `sub` can be used where `parent` is expected.
pub(crate) fn is_subtype(schema: &Schema, sub: &Type, parent: &Type) -> bool {
    match (sub, parent) {
        (Type::NonNull(sub), Type::NonNull(parent)) => is_subtype(schema, sub, parent),
        (Type::NonNull(sub), parent) => is_subtype(schema, sub, parent),
        (_, Type::NonNull(_)) => false,
        (Type::List(sub), Type::List(parent)) => is_subtype(schema, sub, parent),
        (Type::Named(sub), Type::Named(parent)) => {
            sub == parent || (schema[*parent].is_abstract() && schema.possible_types(*parent).contains(sub))
        }
        _ => false,
    }
}
