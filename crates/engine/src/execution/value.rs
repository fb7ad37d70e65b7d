use std::sync::Arc;

use error::{ErrorCode, GraphqlError};
use schema::{Type, TypeDefinitionId, TypeKind};
use serde_json::Value;

use super::{
    Continuation, ExecutionBranch, ExecutionError, ExecutionResult, Frame, Scope, StreamDescriptor, ValueFrame,
    directives,
    selection::resolve_selection_set,
    typecast::{self, ResolvedType},
};
use crate::{
    resolver::{ResolvedValue, ValueIter},
    response::{ResponseValue, ResponseValueId},
};

/// Completes a resolved value against the frame's type and writes it into `slot`.
///
/// Lazy values and batch loads are parked in the branch, the slot stays pending until the
/// driver comes back with their value. Errors and invalid nulls replace the nearest nullable
/// ancestor by null.
pub(crate) fn complete_value(
    scope: &Scope<'_>,
    branch: &mut ExecutionBranch,
    frame: &ValueFrame,
    value: ResolvedValue,
    slot: ResponseValueId,
) -> ExecutionResult<()> {
    if !branch.tree.is_live(slot) {
        return Ok(());
    }

    let value = match value {
        ResolvedValue::Lazy(lazy) => {
            branch.tree.set(slot, ResponseValue::Pending);
            let continuation = Continuation {
                frame: frame.clone(),
                slot,
            };
            branch.lazies.push_back((lazy, continuation));
            return Ok(());
        }
        ResolvedValue::Batch(load) => {
            branch.tree.set(slot, ResponseValue::Pending);
            let continuation = Continuation {
                frame: frame.clone(),
                slot,
            };
            branch.batches.register(load, continuation);
            return Ok(());
        }
        ResolvedValue::Error(err) => {
            record_error(scope, branch, frame, err, slot);
            return Ok(());
        }
        value => value,
    };

    if value.is_null() {
        if frame.ty.is_non_null() {
            let err = GraphqlError::invalid_null(
                scope.schema.type_name(frame.parent_type),
                &scope.schema[frame.field_id].name,
            );
            record_error(scope, branch, frame, err, slot);
        } else {
            branch.tree.set(slot, ResponseValue::Null);
        }
        return Ok(());
    }

    let Some(kind) = scope.schema.type_kind(&frame.ty) else {
        return Err("Input object used as an output type".into());
    };
    match kind {
        TypeKind::NonNull(inner) => complete_value(scope, branch, &frame.with_type(inner), value, slot),
        TypeKind::List(item_type) => complete_list(scope, branch, frame, item_type, value, slot),
        TypeKind::Scalar(scalar) => {
            let coerced = as_json(scope, frame, value).and_then(|value| {
                match scope.resolvers.scalar_coercion(frame.ty.named_type()) {
                    Some(coerce) => coerce(&value),
                    None => scalar.coerce_output(&value).map_err(|err| err.to_string()),
                }
            });
            complete_leaf(scope, branch, frame, coerced, slot);
            Ok(())
        }
        TypeKind::Enum(definition) => {
            let coerced = as_json(scope, frame, value)
                .and_then(|value| definition.coerce_output(&value).map_err(|err| err.to_string()));
            complete_leaf(scope, branch, frame, coerced, slot);
            Ok(())
        }
        TypeKind::Object(object_id) => complete_object(scope, branch, frame, object_id, value, slot),
        TypeKind::Interface(abstract_type) | TypeKind::Union(abstract_type) => {
            let value = match as_json(scope, frame, value) {
                Ok(value) => value,
                Err(message) => {
                    record_error(scope, branch, frame, GraphqlError::field_error(message), slot);
                    return Ok(());
                }
            };
            match typecast::resolve_type(scope, abstract_type, &value) {
                ResolvedType::Object(object_id) => {
                    complete_object(scope, branch, frame, object_id, ResolvedValue::Value(value), slot)
                }
                resolved => {
                    branch.tree.propagate_null(slot);
                    let resolved = match resolved {
                        ResolvedType::NotPossible(name) => name,
                        _ => "no type".to_string(),
                    };
                    let err = ExecutionError::UnresolvedType {
                        abstract_type: scope.schema.type_name(abstract_type).to_string(),
                        resolved,
                        path: frame.error_path(),
                    };
                    tracing::error!("{err}");
                    Err(err)
                }
            }
        }
    }
}

fn complete_object(
    scope: &Scope<'_>,
    branch: &mut ExecutionBranch,
    frame: &ValueFrame,
    object_id: TypeDefinitionId,
    value: ResolvedValue,
    slot: ResponseValueId,
) -> ExecutionResult<()> {
    let value = match as_json(scope, frame, value) {
        Ok(value) => value,
        Err(message) => {
            record_error(scope, branch, frame, GraphqlError::field_error(message), slot);
            return Ok(());
        }
    };
    let response_object_id = branch.tree.push_object(slot)?;
    let object_frame = Frame {
        nodes: frame.nodes.clone(),
        path: frame.path.clone(),
        object_id,
        value: Arc::new(value),
    };
    resolve_selection_set(scope, branch, &object_frame, response_object_id)
}

fn complete_list(
    scope: &Scope<'_>,
    branch: &mut ExecutionBranch,
    frame: &ValueFrame,
    item_type: &Type,
    value: ResolvedValue,
    slot: ResponseValueId,
) -> ExecutionResult<()> {
    let streamed = frame.is_field_value
        && scope.incremental()
        && frame
            .nodes
            .iter()
            .any(|id| directives::should_stream(&scope.operation[*id], scope.variables));

    let items = match value {
        ResolvedValue::Value(Value::Array(items)) => ListItems::Values(items),
        ResolvedValue::List(items) => ListItems::Resolved(items),
        ResolvedValue::Iter(items) => ListItems::Iter(items),
        _ => {
            let message = format!(
                "Expected a list for field {} of type {}",
                scope.schema[frame.field_id].name,
                scope.schema.display_type(&frame.ty)
            );
            record_error(scope, branch, frame, GraphqlError::field_error(message), slot);
            return Ok(());
        }
    };

    if streamed {
        let list_id = branch.tree.push_list(slot, 0)?;
        let stream = StreamDescriptor {
            items: items.into_value_iter(),
            next_index: 0,
            frame: frame.clone(),
            item_type: item_type.clone(),
        };
        branch.defer_stream(list_id, stream);
        return Ok(());
    }

    let items = items.into_vec();
    let list_id = branch.tree.push_list(slot, items.len())?;
    let nullable = item_type.is_nullable();
    for (index, item) in items.into_iter().enumerate() {
        if !branch.tree.is_list_live(list_id) {
            break;
        }
        let item_slot = branch.tree.push_item(list_id, nullable);
        complete_value(scope, branch, &frame.item(index, item_type), item, item_slot)?;
    }
    Ok(())
}

enum ListItems {
    Values(Vec<Value>),
    Resolved(Vec<ResolvedValue>),
    Iter(ValueIter),
}

impl ListItems {
    fn into_value_iter(self) -> ValueIter {
        match self {
            ListItems::Values(items) => ValueIter::new(items.into_iter().map(ResolvedValue::Value)),
            ListItems::Resolved(items) => ValueIter::new(items),
            ListItems::Iter(items) => items,
        }
    }

    fn into_vec(self) -> Vec<ResolvedValue> {
        match self {
            ListItems::Values(items) => items.into_iter().map(ResolvedValue::Value).collect(),
            ListItems::Resolved(items) => items,
            ListItems::Iter(items) => items.collect_remaining(),
        }
    }
}

fn complete_leaf(
    scope: &Scope<'_>,
    branch: &mut ExecutionBranch,
    frame: &ValueFrame,
    coerced: Result<Value, String>,
    slot: ResponseValueId,
) {
    match coerced {
        Ok(value) => branch.tree.set(slot, ResponseValue::Leaf(value)),
        Err(message) => {
            let err = GraphqlError::new(message, ErrorCode::CoercionError);
            record_error(scope, branch, frame, err, slot);
        }
    }
}

/// Plain JSON of a value that cannot be a list.
fn as_json(scope: &Scope<'_>, frame: &ValueFrame, value: ResolvedValue) -> Result<Value, String> {
    match value {
        ResolvedValue::Value(value) => Ok(value),
        _ => Err(format!(
            "Expected a single value for field {} of type {}, got a list",
            scope.schema[frame.field_id].name,
            scope.schema.display_type(&frame.ty)
        )),
    }
}

fn record_error(
    scope: &Scope<'_>,
    branch: &mut ExecutionBranch,
    frame: &ValueFrame,
    err: GraphqlError,
    slot: ResponseValueId,
) {
    let locations = match frame.nodes.first() {
        Some(id) if err.locations.is_empty() => scope.operation[*id].locations().collect(),
        _ => Vec::new(),
    };
    branch.push_error(err.with_locations(locations).with_default_path(frame.error_path()));
    branch.tree.propagate_null(slot);
}
