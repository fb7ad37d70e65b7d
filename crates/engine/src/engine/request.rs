use serde_json::{Map, Value};

/// An operation to execute with everything it needs.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub document: String,
    pub operation_name: Option<String>,
    pub variables: Map<String, Value>,
    /// Value given as parent to the root fields.
    pub root_value: Value,
    /// Passed as is to every resolver.
    pub context: Value,
}

impl Request {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Anything but a JSON object is treated as no variables at all.
    #[must_use]
    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = match variables {
            Value::Object(variables) => variables,
            _ => Map::new(),
        };
        self
    }

    #[must_use]
    pub fn with_root_value(mut self, root_value: Value) -> Self {
        self.root_value = root_value;
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }
}

impl From<&str> for Request {
    fn from(document: &str) -> Self {
        Request::new(document)
    }
}
