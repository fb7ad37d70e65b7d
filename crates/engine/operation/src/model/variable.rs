use schema::Type;
use serde_json::{Map, Value};

use crate::Location;

#[derive(Debug, Clone)]
pub struct VariableDefinitionRecord {
    pub name: String,
    pub ty: Type,
    pub default_value: Option<Value>,
    pub location: Location,
}

/// Variable values of a request after defaults were applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables(Map<String, Value>);

impl Variables {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub(crate) fn insert(&mut self, name: String, value: Value) {
        self.0.insert(name, value);
    }
}

impl From<Map<String, Value>> for Variables {
    fn from(map: Map<String, Value>) -> Self {
        Variables(map)
    }
}
