mod builder;
mod definition;
mod field;
mod ids;
mod scalar;
mod ty;

pub use builder::BuildError;
pub use definition::*;
pub use field::*;
pub use ids::*;
pub use scalar::*;
pub use ty::*;

use fxhash::FxHashMap;

/// Type and field metadata of a GraphQL schema.
///
/// Definitions are stored in flat vectors and addressed by id, the schema never changes once built.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) types: Vec<TypeDefinition>,
    pub(crate) fields: Vec<FieldDefinition>,
    pub(crate) type_by_name: FxHashMap<String, TypeDefinitionId>,
    pub(crate) query_type: TypeDefinitionId,
    pub(crate) mutation_type: Option<TypeDefinitionId>,
    pub(crate) subscription_type: Option<TypeDefinitionId>,
}

impl Schema {
    pub fn from_sdl(sdl: &str) -> Result<Schema, BuildError> {
        builder::build(sdl)
    }

    pub fn query_type(&self) -> TypeDefinitionId {
        self.query_type
    }

    pub fn mutation_type(&self) -> Option<TypeDefinitionId> {
        self.mutation_type
    }

    pub fn subscription_type(&self) -> Option<TypeDefinitionId> {
        self.subscription_type
    }

    pub fn type_definitions(&self) -> impl ExactSizeIterator<Item = (TypeDefinitionId, &TypeDefinition)> + '_ {
        self.types
            .iter()
            .enumerate()
            .map(|(ix, definition)| (TypeDefinitionId::from(ix), definition))
    }

    pub fn type_by_name(&self, name: &str) -> Option<TypeDefinitionId> {
        self.type_by_name.get(name).copied()
    }

    pub fn type_name(&self, id: TypeDefinitionId) -> &str {
        self[id].name()
    }

    /// Looks up a field on an object or interface.
    pub fn field(&self, type_id: TypeDefinitionId, name: &str) -> Option<FieldDefinitionId> {
        self[type_id]
            .field_ids()
            .iter()
            .copied()
            .find(|id| self[*id].name == name)
    }

    pub fn field_by_coordinate(&self, type_name: &str, field_name: &str) -> Option<FieldDefinitionId> {
        self.type_by_name(type_name)
            .and_then(|type_id| self.field(type_id, field_name))
    }

    /// Concrete object types a value of this type may have at runtime.
    pub fn possible_types(&self, id: TypeDefinitionId) -> &[TypeDefinitionId] {
        match &self[id] {
            TypeDefinition::Interface(interface) => &interface.possible_types,
            TypeDefinition::Union(union) => &union.possible_types,
            TypeDefinition::Object(object) => std::slice::from_ref(&object.id),
            _ => &[],
        }
    }

    pub fn is_possible_type(&self, abstract_type: TypeDefinitionId, object_type: TypeDefinitionId) -> bool {
        abstract_type == object_type || self.possible_types(abstract_type).contains(&object_type)
    }

    /// Whether `type_id` declares `interface_id` among its implemented interfaces.
    pub fn implements(&self, type_id: TypeDefinitionId, interface_id: TypeDefinitionId) -> bool {
        match &self[type_id] {
            TypeDefinition::Object(object) => object.interfaces.contains(&interface_id),
            TypeDefinition::Interface(interface) => interface.interfaces.contains(&interface_id),
            _ => false,
        }
    }

    /// Output kind of a wrapped type, `None` for input objects which cannot be returned by fields.
    pub fn type_kind<'s>(&'s self, ty: &'s Type) -> Option<TypeKind<'s>> {
        let kind = match ty {
            Type::NonNull(inner) => TypeKind::NonNull(inner),
            Type::List(inner) => TypeKind::List(inner),
            Type::Named(id) => match &self[*id] {
                TypeDefinition::Scalar(scalar) => TypeKind::Scalar(scalar),
                TypeDefinition::Enum(definition) => TypeKind::Enum(definition),
                TypeDefinition::Object(_) => TypeKind::Object(*id),
                TypeDefinition::Interface(_) => TypeKind::Interface(*id),
                TypeDefinition::Union(_) => TypeKind::Union(*id),
                TypeDefinition::InputObject(_) => return None,
            },
        };
        Some(kind)
    }

    pub fn display_type<'s>(&'s self, ty: &'s Type) -> DisplayType<'s> {
        DisplayType { schema: self, ty }
    }
}
