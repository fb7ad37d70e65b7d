use async_graphql_value::Value;
use schema::Schema;
use serde_json::Map;

use crate::{Error, Operation, Variables};

use super::error::VariableError;

/// Converts an input value of the document into JSON, substituting variables.
/// Enum values become strings and missing variables become null.
pub(crate) fn resolve_input_value(value: &Value, variables: &Variables) -> serde_json::Value {
    match value {
        Value::Variable(name) => variables.get(name).cloned().unwrap_or_default(),
        Value::Null => serde_json::Value::Null,
        Value::Number(number) => serde_json::Value::Number(number.clone()),
        Value::String(string) => serde_json::Value::String(string.clone()),
        Value::Boolean(boolean) => serde_json::Value::Bool(*boolean),
        Value::Binary(bytes) => serde_json::Value::from(bytes.to_vec()),
        Value::Enum(name) => serde_json::Value::String(name.to_string()),
        Value::List(items) => items
            .iter()
            .map(|item| resolve_input_value(item, variables))
            .collect(),
        Value::Object(fields) => serde_json::Value::Object(
            fields
                .iter()
                .map(|(name, value)| (name.to_string(), resolve_input_value(value, variables)))
                .collect(),
        ),
    }
}

pub(crate) fn bind_variables(
    schema: &Schema,
    operation: &Operation,
    mut raw: Map<String, serde_json::Value>,
) -> Result<Variables, Vec<Error>> {
    let mut variables = Variables::default();
    let mut errors = Vec::new();

    for definition in &operation.variable_definitions {
        match raw.remove(&definition.name) {
            Some(serde_json::Value::Null) if definition.ty.is_non_null() && definition.default_value.is_none() => {
                let err = VariableError::UnexpectedNull {
                    name: definition.name.clone(),
                    ty: schema.display_type(&definition.ty).to_string(),
                };
                errors.push(Error::variable(err.to_string()).with_location(definition.location));
            }
            Some(value) => variables.insert(definition.name.clone(), value),
            None => match &definition.default_value {
                Some(default) => variables.insert(definition.name.clone(), default.clone()),
                None if definition.ty.is_non_null() => {
                    let err = VariableError::MissingVariable {
                        name: definition.name.clone(),
                    };
                    errors.push(Error::variable(err.to_string()).with_location(definition.location));
                }
                None => {}
            },
        }
    }

    if errors.is_empty() { Ok(variables) } else { Err(errors) }
}
