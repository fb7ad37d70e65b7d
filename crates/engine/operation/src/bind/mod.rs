mod error;
mod variables;

use std::collections::HashMap;

use async_graphql_parser::{
    Positioned,
    types::{self as ast, BaseType},
};
use async_graphql_value::{Name, Value};
use schema::{Schema, Type, TypeDefinition, TypeDefinitionId};

use crate::{
    DirectiveRecord, Error, Location, Occurrence, Operation, OperationType, QueryPosition, ResponseKey,
    SelectionKind, SelectionNodeId, SelectionNodeRecord, SelectionSetRecord, VariableDefinitionRecord,
};

use error::BindError;
pub(crate) use variables::*;

pub(crate) fn bind_operation(
    schema: &Schema,
    name: Option<&str>,
    definition: &Positioned<ast::OperationDefinition>,
    fragments: &HashMap<Name, Positioned<ast::FragmentDefinition>>,
) -> Result<Operation, Vec<Error>> {
    let location = Location::from(definition.pos);
    let ty = OperationType::from(definition.node.ty);
    let root_object_id = match ty {
        OperationType::Query => Some(schema.query_type()),
        OperationType::Mutation => schema.mutation_type(),
        OperationType::Subscription => schema.subscription_type(),
    };
    let Some(root_object_id) = root_object_id else {
        let err = match ty {
            OperationType::Mutation => BindError::NoMutationDefined,
            _ => BindError::NoSubscriptionDefined,
        };
        return Err(vec![Error::validation(err.to_string()).with_location(location)]);
    };

    let mut binder = Binder {
        schema,
        fragments,
        nodes: Vec::new(),
        next_position: 0,
        fragment_stack: Vec::new(),
        errors: Vec::new(),
    };

    let variable_definitions = binder.bind_variable_definitions(&definition.node.variable_definitions);
    let mut root_selection_set = SelectionSetRecord::default();
    binder.bind_selection_set(
        &mut root_selection_set,
        root_object_id,
        &definition.node.selection_set,
        &[],
    );

    if !binder.errors.is_empty() {
        tracing::debug!(errors = binder.errors.len(), "Operation binding failed");
        return Err(binder.errors);
    }

    Ok(Operation {
        ty,
        name: name.map(str::to_string),
        location,
        root_object_id,
        root_selection_set,
        variable_definitions,
        nodes: binder.nodes,
    })
}

struct Binder<'a> {
    schema: &'a Schema,
    fragments: &'a HashMap<Name, Positioned<ast::FragmentDefinition>>,
    nodes: Vec<SelectionNodeRecord>,
    next_position: u32,
    fragment_stack: Vec<&'a str>,
    errors: Vec<Error>,
}

impl<'a> Binder<'a> {
    fn error(&mut self, err: BindError, location: Location) {
        self.errors.push(Error::validation(err.to_string()).with_location(location));
    }

    fn bind_variable_definitions(
        &mut self,
        definitions: &'a [Positioned<ast::VariableDefinition>],
    ) -> Vec<VariableDefinitionRecord> {
        let mut records: Vec<VariableDefinitionRecord> = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let location = Location::from(definition.pos);
            let name = definition.node.name.node.to_string();
            if records.iter().any(|record| record.name == name) {
                self.error(BindError::DuplicateVariable { name }, location);
                continue;
            }
            let Some(ty) = self.convert_type(&definition.node.var_type.node, location) else {
                continue;
            };
            let named = &self.schema[ty.named_type()];
            if !named.is_input() {
                let ty = self.schema.display_type(&ty).to_string();
                self.error(BindError::InvalidVariableType { name, ty }, location);
                continue;
            }
            let default_value = definition
                .node
                .default_value
                .as_ref()
                .map(|value| resolve_input_value(&value.node.clone().into_value(), &Default::default()));
            records.push(VariableDefinitionRecord {
                name,
                ty,
                default_value,
                location,
            });
        }
        records
    }

    fn convert_type(&mut self, ty: &ast::Type, location: Location) -> Option<Type> {
        let base = match &ty.base {
            BaseType::Named(name) => match self.schema.type_by_name(name.as_str()) {
                Some(id) => Type::Named(id),
                None => {
                    self.error(BindError::UnknownType { name: name.to_string() }, location);
                    return None;
                }
            },
            BaseType::List(inner) => self.convert_type(inner, location)?.list(),
        };
        Some(if ty.nullable { base } else { base.non_null() })
    }

    fn bind_selection_set(
        &mut self,
        target: &mut SelectionSetRecord,
        type_condition: TypeDefinitionId,
        selection_set: &'a Positioned<ast::SelectionSet>,
        inherited_directives: &[DirectiveRecord],
    ) {
        for selection in &selection_set.node.items {
            match &selection.node {
                ast::Selection::Field(field) => {
                    self.bind_field(target, type_condition, field, inherited_directives);
                }
                ast::Selection::InlineFragment(fragment) => {
                    let location = Location::from(fragment.pos);
                    let condition = match &fragment.node.type_condition {
                        Some(condition) => {
                            match self.bind_type_condition(type_condition, &condition.node.on.node, location) {
                                Some(condition) => condition,
                                None => continue,
                            }
                        }
                        None => type_condition,
                    };
                    let Some(directives) = self.extend_directives(inherited_directives, &fragment.node.directives)
                    else {
                        continue;
                    };
                    self.bind_selection_set(target, condition, &fragment.node.selection_set, &directives);
                }
                ast::Selection::FragmentSpread(spread) => {
                    let location = Location::from(spread.pos);
                    let name = spread.node.fragment_name.node.as_str();
                    let fragments = self.fragments;
                    let Some(fragment) = fragments.get(name) else {
                        self.error(BindError::UnknownFragment { name: name.to_string() }, location);
                        continue;
                    };
                    if self.fragment_stack.contains(&name) {
                        let mut cycle = self
                            .fragment_stack
                            .iter()
                            .map(|name| name.to_string())
                            .collect::<Vec<_>>();
                        cycle.push(name.to_string());
                        self.error(BindError::FragmentCycle { cycle }, location);
                        continue;
                    }
                    let Some(condition) =
                        self.bind_type_condition(type_condition, &fragment.node.type_condition.node.on.node, location)
                    else {
                        continue;
                    };
                    let Some(directives) = self.extend_directives(inherited_directives, &spread.node.directives)
                    else {
                        continue;
                    };
                    self.fragment_stack.push(name);
                    self.bind_selection_set(target, condition, &fragment.node.selection_set, &directives);
                    self.fragment_stack.pop();
                }
            }
        }
    }

    fn bind_field(
        &mut self,
        target: &mut SelectionSetRecord,
        type_condition: TypeDefinitionId,
        field: &'a Positioned<ast::Field>,
        inherited_directives: &[DirectiveRecord],
    ) {
        let location = Location::from(field.pos);
        let name = field.node.name.node.as_str();
        let response_key = field.node.response_key().node.as_str();
        let has_selection_set = !field.node.selection_set.node.items.is_empty();

        let (kind, output_type) = if name == "__typename" {
            (SelectionKind::Typename, None)
        } else {
            let Some(id) = self.schema.field(type_condition, name) else {
                let container = self.schema.type_name(type_condition).to_string();
                let err = if matches!(self.schema[type_condition], TypeDefinition::Union(_)) {
                    BindError::UnionHaveNoFields {
                        name: name.to_string(),
                        ty: container,
                    }
                } else {
                    BindError::UnknownField {
                        container,
                        name: name.to_string(),
                    }
                };
                self.error(err, location);
                return;
            };
            (SelectionKind::Field(id), Some(self.schema[id].ty.named_type()))
        };

        let composite_type = output_type.filter(|ty| self.schema[*ty].is_composite());
        match (composite_type, has_selection_set) {
            (Some(ty), false) => {
                let ty = self.schema.type_name(ty).to_string();
                self.error(
                    BindError::MissingSelectionSet {
                        name: name.to_string(),
                        ty,
                    },
                    location,
                );
                return;
            }
            (None, true) => {
                let ty = output_type
                    .map(|ty| self.schema.type_name(ty).to_string())
                    .unwrap_or_else(|| "String".to_string());
                self.error(
                    BindError::CannotHaveSelectionSet {
                        name: name.to_string(),
                        ty,
                    },
                    location,
                );
                return;
            }
            _ => {}
        }

        if let SelectionKind::Field(id) = kind {
            let definition = &self.schema[id];
            for (argument, _) in &field.node.arguments {
                if definition.argument(argument.node.as_str()).is_none() {
                    let err = BindError::UnknownArgument {
                        field_name: definition.name.clone(),
                        argument_name: argument.node.to_string(),
                    };
                    self.error(err, Location::from(argument.pos));
                }
            }
        }

        let Some(directives) = self.extend_directives(inherited_directives, &field.node.directives) else {
            return;
        };
        let occurrence = Occurrence { location, directives };

        let node_id = match target.find(type_condition, response_key, &self.nodes) {
            Some(id) => {
                let existing = &self.nodes[usize::from(id)];
                if existing.kind != kind {
                    let err = BindError::ConflictingFields {
                        key: response_key.to_string(),
                        first: existing.name(self.schema).to_string(),
                        second: name.to_string(),
                    };
                    self.error(err, location);
                    return;
                }
                self.nodes[usize::from(id)].occurrences.push(occurrence);
                id
            }
            None => {
                let id = SelectionNodeId::from(self.nodes.len());
                self.next_position += 1;
                self.nodes.push(SelectionNodeRecord {
                    response_key: ResponseKey::from(response_key),
                    kind,
                    query_position: QueryPosition(self.next_position),
                    arguments: field
                        .node
                        .arguments
                        .iter()
                        .map(|(name, value)| (name.node.to_string(), value.node.clone()))
                        .collect(),
                    occurrences: vec![occurrence],
                    selection_set: SelectionSetRecord::default(),
                });
                target.push(type_condition, id);
                id
            }
        };

        if let Some(ty) = composite_type {
            let mut selection_set = std::mem::take(&mut self.nodes[usize::from(node_id)].selection_set);
            self.bind_selection_set(&mut selection_set, ty, &field.node.selection_set, &[]);
            self.nodes[usize::from(node_id)].selection_set = selection_set;
        }
    }

    /// Validates a fragment type condition and returns the condition under which its
    /// selections apply. An object type is never widened by an enclosing abstract condition.
    fn bind_type_condition(
        &mut self,
        current: TypeDefinitionId,
        name: &Name,
        location: Location,
    ) -> Option<TypeDefinitionId> {
        let Some(condition) = self.schema.type_by_name(name.as_str()) else {
            self.error(BindError::UnknownType { name: name.to_string() }, location);
            return None;
        };
        if !self.schema[condition].is_composite() {
            self.error(
                BindError::InvalidTypeConditionTargetType { name: name.to_string() },
                location,
            );
            return None;
        }

        let current_types = self.schema.possible_types(current);
        if !self
            .schema
            .possible_types(condition)
            .iter()
            .any(|ty| current_types.contains(ty))
        {
            let parent = self.schema.type_name(current).to_string();
            self.error(
                BindError::DisjointTypeCondition {
                    parent,
                    name: name.to_string(),
                },
                location,
            );
            return None;
        }

        let narrowed = match (&self.schema[condition], &self.schema[current]) {
            (TypeDefinition::Object(_), _) => condition,
            (_, TypeDefinition::Object(_)) => current,
            _ => condition,
        };
        Some(narrowed)
    }

    fn extend_directives(
        &mut self,
        inherited: &[DirectiveRecord],
        directives: &[Positioned<ast::Directive>],
    ) -> Option<Vec<DirectiveRecord>> {
        let mut records = inherited.to_vec();
        for directive in directives {
            let name = directive.node.name.node.as_str();
            let location = Location::from(directive.pos);
            if matches!(name, "skip" | "include") && directive.node.get_argument("if").is_none() {
                self.error(
                    BindError::MissingDirectiveArgument {
                        name: "if",
                        directive: name.to_string(),
                    },
                    location,
                );
                return None;
            }
            records.push(DirectiveRecord {
                name: name.to_string(),
                location,
                arguments: directive
                    .node
                    .arguments
                    .iter()
                    .map(|(name, value)| (name.node.to_string(), value.node.clone()))
                    .collect(),
            });
        }
        Some(records)
    }
}
