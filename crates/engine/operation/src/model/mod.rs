mod directive;
mod location;
mod response_key;
mod selection_set;
mod variable;

pub use directive::*;
pub use location::*;
pub use response_key::*;
pub use selection_set::*;
pub use variable::*;

use schema::TypeDefinitionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl From<async_graphql_parser::types::OperationType> for OperationType {
    fn from(ty: async_graphql_parser::types::OperationType) -> Self {
        match ty {
            async_graphql_parser::types::OperationType::Query => OperationType::Query,
            async_graphql_parser::types::OperationType::Mutation => OperationType::Mutation,
            async_graphql_parser::types::OperationType::Subscription => OperationType::Subscription,
        }
    }
}

/// An operation bound to a schema: every field references its definition and selections are
/// grouped by the type condition under which they apply.
#[derive(Debug, Clone)]
pub struct Operation {
    pub ty: OperationType,
    pub name: Option<String>,
    pub location: Location,
    pub root_object_id: TypeDefinitionId,
    pub root_selection_set: SelectionSetRecord,
    pub variable_definitions: Vec<VariableDefinitionRecord>,
    pub(crate) nodes: Vec<SelectionNodeRecord>,
}

impl Operation {
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = (SelectionNodeId, &SelectionNodeRecord)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(ix, node)| (SelectionNodeId::from(ix), node))
    }
}

impl std::ops::Index<SelectionNodeId> for Operation {
    type Output = SelectionNodeRecord;

    fn index(&self, id: SelectionNodeId) -> &Self::Output {
        &self.nodes[usize::from(id)]
    }
}
