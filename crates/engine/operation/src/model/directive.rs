use async_graphql_value::Value;

use crate::{Location, Variables, bind::resolve_input_value};

/// A directive applied to a field, either directly or through an enclosing fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveRecord {
    pub name: String,
    pub location: Location,
    pub arguments: Vec<(String, Value)>,
}

impl DirectiveRecord {
    /// Value of an argument with variables substituted. A variable that was not provided
    /// yields `None`, like an absent argument.
    pub fn argument(&self, name: &str, variables: &Variables) -> Option<serde_json::Value> {
        let (_, value) = self.arguments.iter().find(|(arg, _)| arg == name)?;
        match value {
            Value::Variable(variable) => variables.get(variable).cloned(),
            value => Some(resolve_input_value(value, variables)),
        }
    }

    pub fn bool_argument(&self, name: &str, variables: &Variables) -> Option<bool> {
        self.argument(name, variables).and_then(|value| value.as_bool())
    }
}
