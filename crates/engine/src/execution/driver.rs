use operation::OperationType;

use super::{ExecutionBranch, ExecutionError, ExecutionResult, Frame, Scope, selection, value::complete_value};
use crate::response::ResponseValueId;

/// Resolves the operation's root selection set into the branch, including all lazy and batched
/// values. Mutation fields are resolved one after the other, each one completely before the next.
pub(crate) async fn execute_root(scope: &Scope<'_>, branch: &mut ExecutionBranch, frame: Frame) -> ExecutionResult<()> {
    let object_id = branch.tree.push_object(ResponseValueId::Root)?;
    if scope.operation.ty == OperationType::Mutation {
        for group in selection::collect_fields(scope, &frame) {
            if !branch.tree.is_object_live(object_id) {
                break;
            }
            tracing::trace!(key = %group.key, "Resolving mutation field");
            selection::resolve_group(scope, branch, &frame, object_id, group)?;
            drain(scope, branch).await?;
        }
        Ok(())
    } else {
        selection::resolve_selection_set(scope, branch, &frame, object_id)?;
        drain(scope, branch).await
    }
}

/// Forces lazy values and flushes batches until neither has anything left. Lazy values are
/// forced first so that the batches they register join the next flush. Loads still pending after
/// `max_batch_generations` flushes, such as loaders resolving to each other, fail the execution.
pub(crate) async fn drain(scope: &Scope<'_>, branch: &mut ExecutionBranch) -> ExecutionResult<()> {
    let mut generation = 0;
    loop {
        tracing::trace!(generation, lazies = branch.lazies.len(), "Forcing lazy values");
        while let Some((lazy, continuation)) = branch.lazies.pop_front() {
            if !branch.tree.is_live(continuation.slot) {
                continue;
            }
            let value = lazy.value();
            complete_value(scope, branch, &continuation.frame, value, continuation.slot)?;
        }

        if !branch.batches.any() {
            return Ok(());
        }
        generation += 1;
        if generation > scope.config.max_batch_generations {
            let err = ExecutionError::LoaderExhausted {
                loader: branch.batches.pending_loaders(),
                keys: branch.batches.pending_keys(),
                attempts: scope.config.max_batch_generations,
            };
            tracing::error!("{err}");
            return Err(err);
        }
        tracing::debug!(generation, groups = branch.batches.len(), "Flushing batches");
        let resolved = branch
            .batches
            .resolve_all(scope.config.scheduling, scope.config.max_batch_generations)
            .await?;
        for (continuation, value) in resolved {
            complete_value(scope, branch, &continuation.frame, value, continuation.slot)?;
        }
    }
}
