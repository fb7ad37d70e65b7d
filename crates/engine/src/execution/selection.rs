use std::sync::Arc;

use error::GraphqlError;
use indexmap::IndexMap;
use operation::{QueryPosition, ResponseKey, SelectionKind, SelectionNodeId, SelectionSetRecord};
use schema::FieldDefinitionId;
use serde_json::Value;

use super::{ExecutionBranch, ExecutionResult, Frame, Scope, ValueFrame, directives, typecast, value::complete_value};
use crate::{
    resolver::ResolverContext,
    response::{ResponseObjectId, ResponseValue, ResponseValueId},
};

/// Nodes requested under one response key, across every applicable type condition.
pub(crate) struct FieldGroup {
    pub key: ResponseKey,
    pub nodes: Arc<[SelectionNodeId]>,
}

/// Fields of the frame's selection sets applying to its object, grouped by response key in
/// document order. Excluded fields are left out.
pub(crate) fn collect_fields(scope: &Scope<'_>, frame: &Frame) -> Vec<FieldGroup> {
    let selection_sets: Vec<&SelectionSetRecord> = if frame.nodes.is_empty() {
        vec![&scope.operation.root_selection_set]
    } else {
        frame
            .nodes
            .iter()
            .map(|id| &scope.operation[*id].selection_set)
            .collect()
    };

    let mut groups: IndexMap<ResponseKey, (QueryPosition, Vec<SelectionNodeId>)> = IndexMap::new();
    for children in selection_sets.into_iter().flat_map(|set| &set.typed_children) {
        if !typecast::compatible(scope, frame.object_id, children.type_condition, &frame.value) {
            continue;
        }
        for &id in &children.nodes {
            let node = &scope.operation[id];
            if !directives::is_node_included(node, scope.variables) {
                continue;
            }
            let (position, nodes) = groups
                .entry(node.response_key.clone())
                .or_insert_with(|| (node.query_position, Vec::new()));
            *position = (*position).min(node.query_position);
            nodes.push(id);
        }
    }

    let mut groups = groups.into_iter().collect::<Vec<_>>();
    groups.sort_by_key(|(_, (position, _))| *position);
    groups
        .into_iter()
        .map(|(key, (_, nodes))| FieldGroup {
            key,
            nodes: nodes.into(),
        })
        .collect()
}

pub(crate) fn resolve_selection_set(
    scope: &Scope<'_>,
    branch: &mut ExecutionBranch,
    frame: &Frame,
    object_id: ResponseObjectId,
) -> ExecutionResult<()> {
    for group in collect_fields(scope, frame) {
        if !branch.tree.is_object_live(object_id) {
            break;
        }
        resolve_group(scope, branch, frame, object_id, group)?;
    }
    Ok(())
}

/// Adds the field to the object and resolves it, unless it is deferred.
pub(crate) fn resolve_group(
    scope: &Scope<'_>,
    branch: &mut ExecutionBranch,
    frame: &Frame,
    object_id: ResponseObjectId,
    group: FieldGroup,
) -> ExecutionResult<()> {
    if scope.incremental()
        && group
            .nodes
            .iter()
            .all(|id| directives::should_defer(&scope.operation[*id], scope.variables))
    {
        tracing::trace!(key = %group.key, "Deferring field");
        branch.defer_field(object_id, frame.clone(), group.nodes);
        return Ok(());
    }

    let node = &scope.operation[group.nodes[0]];
    let nullable = match node.kind {
        SelectionKind::Field(bound_id) => scope.schema[concrete_field_id(scope, frame, bound_id)].ty.is_nullable(),
        SelectionKind::Typename => false,
    };
    let slot = branch.tree.push_field(object_id, group.key, nullable);
    resolve_field(scope, branch, frame, &group.nodes, slot)
}

/// Resolves the field made of `nodes` on the frame's object and completes its value into `slot`.
pub(crate) fn resolve_field(
    scope: &Scope<'_>,
    branch: &mut ExecutionBranch,
    frame: &Frame,
    nodes: &Arc<[SelectionNodeId]>,
    slot: ResponseValueId,
) -> ExecutionResult<()> {
    let Some(&first) = nodes.first() else {
        return Err("Field without selection node".into());
    };
    let node = &scope.operation[first];
    let SelectionKind::Field(bound_id) = node.kind else {
        let typename = scope.schema.type_name(frame.object_id).to_owned();
        branch.tree.set(slot, ResponseValue::Leaf(Value::String(typename)));
        return Ok(());
    };

    let field_id = concrete_field_id(scope, frame, bound_id);
    let field = &scope.schema[field_id];
    let value_frame = ValueFrame {
        nodes: nodes.clone(),
        path: frame.field_path(&node.response_key),
        ty: field.ty.clone(),
        parent_type: frame.object_id,
        field_id,
        is_field_value: true,
    };

    let arguments = match node.arguments_for(field, scope.variables) {
        Ok(arguments) => arguments,
        Err(err) => {
            branch.push_error(GraphqlError::from(err).with_path(value_frame.error_path()));
            branch.tree.propagate_null(slot);
            return Ok(());
        }
    };
    let ctx = ResolverContext {
        parent: &frame.value,
        parent_type: scope.schema.type_name(frame.object_id),
        field,
        arguments: &arguments,
        context: scope.context,
    };
    let value = scope.resolvers.resolve(field_id, bound_id, ctx);
    complete_value(scope, branch, &value_frame, value, slot)
}

/// Field of the concrete object type, selections on interfaces are bound to the interface field.
fn concrete_field_id(scope: &Scope<'_>, frame: &Frame, bound_id: FieldDefinitionId) -> FieldDefinitionId {
    scope
        .schema
        .field(frame.object_id, &scope.schema[bound_id].name)
        .unwrap_or(bound_id)
}
