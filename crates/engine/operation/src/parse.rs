use async_graphql_parser::{
    Positioned,
    types::{ExecutableDocument, OperationDefinition},
};

use crate::{Error, Location};

pub(crate) fn parse_document(document: &str) -> Result<ExecutableDocument, Error> {
    async_graphql_parser::parse_query(document)
        .map_err(|err| Error::parsing(err.to_string()).with_locations(err.positions().map(Location::from)))
}

/// Selects the operation to execute: the one named by the request, or the only one in the document.
pub(crate) fn select_operation<'d>(
    document: &'d ExecutableDocument,
    operation_name: Option<&str>,
) -> Result<(Option<&'d str>, &'d Positioned<OperationDefinition>), Error> {
    let mut operations = document.operations.iter();
    match operation_name {
        Some(expected) => operations
            .find(|(name, _)| name.map(|name| name.as_str()) == Some(expected))
            .map(|(name, operation)| (name.map(|name| name.as_str()), operation))
            .ok_or_else(|| Error::parsing(format!("Unknown operation named '{expected}'."))),
        None => match (operations.next(), operations.next()) {
            (Some((name, operation)), None) => Ok((name.map(|name| name.as_str()), operation)),
            (None, _) => Err(Error::parsing("The document does not contain any operation.")),
            (Some(_), Some(_)) => Err(Error::parsing(
                "The document contains multiple operations, an operation name is required.",
            )),
        },
    }
}
