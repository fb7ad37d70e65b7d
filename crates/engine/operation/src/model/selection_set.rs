use async_graphql_value::Value;
use schema::{FieldDefinition, FieldDefinitionId, Schema, TypeDefinitionId};

use crate::{DirectiveRecord, Error, Location, QueryPosition, ResponseKey, Variables, bind::resolve_input_value};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionNodeId(u32);

impl From<usize> for SelectionNodeId {
    fn from(index: usize) -> Self {
        SelectionNodeId(index as u32)
    }
}

impl From<SelectionNodeId> for usize {
    fn from(id: SelectionNodeId) -> usize {
        id.0 as usize
    }
}

impl std::fmt::Debug for SelectionNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SelectionNodeId#{}", self.0)
    }
}

/// Selections of a selection set grouped by the type condition they were requested under,
/// in order of first appearance. Fields sharing a response key under the same condition are
/// merged into a single node.
#[derive(Debug, Clone, Default)]
pub struct SelectionSetRecord {
    pub typed_children: Vec<TypedChildren>,
}

#[derive(Debug, Clone)]
pub struct TypedChildren {
    pub type_condition: TypeDefinitionId,
    pub nodes: Vec<SelectionNodeId>,
}

impl SelectionSetRecord {
    pub fn is_empty(&self) -> bool {
        self.typed_children.iter().all(|children| children.nodes.is_empty())
    }

    pub(crate) fn find(
        &self,
        type_condition: TypeDefinitionId,
        response_key: &str,
        nodes: &[SelectionNodeRecord],
    ) -> Option<SelectionNodeId> {
        self.typed_children
            .iter()
            .find(|children| children.type_condition == type_condition)?
            .nodes
            .iter()
            .copied()
            .find(|id| nodes[usize::from(*id)].response_key.as_str() == response_key)
    }

    pub(crate) fn push(&mut self, type_condition: TypeDefinitionId, id: SelectionNodeId) {
        match self
            .typed_children
            .iter_mut()
            .find(|children| children.type_condition == type_condition)
        {
            Some(children) => children.nodes.push(id),
            None => self.typed_children.push(TypedChildren {
                type_condition,
                nodes: vec![id],
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Field(FieldDefinitionId),
    Typename,
}

/// One place a field appears in the document, with the directives that apply there.
#[derive(Debug, Clone)]
pub struct Occurrence {
    pub location: Location,
    pub directives: Vec<DirectiveRecord>,
}

#[derive(Debug, Clone)]
pub struct SelectionNodeRecord {
    pub response_key: ResponseKey,
    pub kind: SelectionKind,
    pub query_position: QueryPosition,
    pub arguments: Vec<(String, Value)>,
    pub occurrences: Vec<Occurrence>,
    pub selection_set: SelectionSetRecord,
}

impl SelectionNodeRecord {
    pub fn definition_id(&self) -> Option<FieldDefinitionId> {
        match self.kind {
            SelectionKind::Field(id) => Some(id),
            SelectionKind::Typename => None,
        }
    }

    pub fn name<'s>(&self, schema: &'s Schema) -> &'s str {
        match self.kind {
            SelectionKind::Field(id) => &schema[id].name,
            SelectionKind::Typename => "__typename",
        }
    }

    pub fn location(&self) -> Location {
        self.occurrences
            .first()
            .map(|occurrence| occurrence.location)
            .unwrap_or(Location::new(0, 0))
    }

    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.occurrences.iter().map(|occurrence| occurrence.location)
    }

    /// Arguments of the field with variables substituted and defaults applied.
    pub fn arguments_for(
        &self,
        definition: &FieldDefinition,
        variables: &Variables,
    ) -> Result<serde_json::Map<String, serde_json::Value>, Error> {
        let mut arguments = serde_json::Map::new();
        for argument in &definition.arguments {
            let provided = self
                .arguments
                .iter()
                .find(|(name, _)| *name == argument.name)
                .map(|(_, value)| value);
            let value = match provided {
                Some(Value::Variable(variable)) => variables
                    .get(variable)
                    .cloned()
                    .or_else(|| argument.default_value.clone()),
                Some(value) => Some(resolve_input_value(value, variables)),
                None => argument.default_value.clone(),
            };
            match value {
                Some(serde_json::Value::Null) | None if argument.ty.is_non_null() => {
                    return Err(Error::validation(format!(
                        "Missing argument named '{}' for field '{}'",
                        argument.name, definition.name
                    ))
                    .with_location(self.location()));
                }
                Some(value) => {
                    arguments.insert(argument.name.clone(), value);
                }
                None => {}
            }
        }
        Ok(arguments)
    }
}
