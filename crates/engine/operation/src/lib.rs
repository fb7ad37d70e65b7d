mod bind;
mod error;
mod model;
mod parse;

pub use error::*;
pub use model::*;
use schema::Schema;

impl Operation {
    /// Parses a document and binds the selected operation to the schema. Errors cover syntax,
    /// unknown types, fields, arguments and fragments as well as selection set shape.
    pub fn parse(schema: &Schema, operation_name: Option<&str>, document: &str) -> Result<Operation, Vec<Error>> {
        let document = parse::parse_document(document).map_err(|err| vec![err])?;
        let (name, definition) = parse::select_operation(&document, operation_name).map_err(|err| vec![err])?;
        bind::bind_operation(schema, name, definition, &document.fragments)
    }
}

impl Variables {
    pub fn bind(
        schema: &Schema,
        operation: &Operation,
        variables: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, Vec<Error>> {
        bind::bind_variables(schema, operation, variables)
    }
}
