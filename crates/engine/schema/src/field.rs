use crate::{Type, TypeDefinitionId};

#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub description: Option<String>,
    /// Object or interface declaring the field.
    pub parent: TypeDefinitionId,
    pub ty: Type,
    pub arguments: Vec<InputValueDefinition>,
}

impl FieldDefinition {
    pub fn argument(&self, name: &str) -> Option<&InputValueDefinition> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct InputValueDefinition {
    pub name: String,
    pub ty: Type,
    pub default_value: Option<serde_json::Value>,
}
