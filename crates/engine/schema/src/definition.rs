use crate::{FieldDefinitionId, InputValueDefinition, ScalarDefinition, TypeDefinitionId};

#[derive(Debug, Clone)]
pub enum TypeDefinition {
    Scalar(ScalarDefinition),
    Enum(EnumDefinition),
    Object(ObjectDefinition),
    Interface(InterfaceDefinition),
    Union(UnionDefinition),
    InputObject(InputObjectDefinition),
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Scalar(def) => &def.name,
            TypeDefinition::Enum(def) => &def.name,
            TypeDefinition::Object(def) => &def.name,
            TypeDefinition::Interface(def) => &def.name,
            TypeDefinition::Union(def) => &def.name,
            TypeDefinition::InputObject(def) => &def.name,
        }
    }

    pub fn field_ids(&self) -> &[FieldDefinitionId] {
        match self {
            TypeDefinition::Object(def) => &def.fields,
            TypeDefinition::Interface(def) => &def.fields,
            _ => &[],
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            TypeDefinition::Object(_) | TypeDefinition::Interface(_) | TypeDefinition::Union(_)
        )
    }

    pub fn is_object(&self) -> bool {
        matches!(self, TypeDefinition::Object(_))
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self, TypeDefinition::Interface(_) | TypeDefinition::Union(_))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TypeDefinition::Scalar(_) | TypeDefinition::Enum(_))
    }

    pub fn is_input(&self) -> bool {
        matches!(
            self,
            TypeDefinition::Scalar(_) | TypeDefinition::Enum(_) | TypeDefinition::InputObject(_)
        )
    }
}

#[derive(Debug, Clone)]
pub struct ObjectDefinition {
    pub id: TypeDefinitionId,
    pub name: String,
    pub description: Option<String>,
    pub interfaces: Vec<TypeDefinitionId>,
    pub fields: Vec<FieldDefinitionId>,
}

#[derive(Debug, Clone)]
pub struct InterfaceDefinition {
    pub name: String,
    pub description: Option<String>,
    pub interfaces: Vec<TypeDefinitionId>,
    pub fields: Vec<FieldDefinitionId>,
    /// Objects implementing this interface, in definition order.
    pub possible_types: Vec<TypeDefinitionId>,
}

#[derive(Debug, Clone)]
pub struct UnionDefinition {
    pub name: String,
    pub description: Option<String>,
    pub possible_types: Vec<TypeDefinitionId>,
}

#[derive(Debug, Clone)]
pub struct InputObjectDefinition {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<InputValueDefinition>,
}

#[derive(Debug, Clone)]
pub struct EnumDefinition {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<String>,
}

impl EnumDefinition {
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}
