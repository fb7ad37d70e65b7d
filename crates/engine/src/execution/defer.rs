use std::collections::VecDeque;

use error::{ErrorPathSegment, GraphqlError};

use super::{
    Deferral, ExecutionBranch, ExecutionResult, Path, Scope, StreamDescriptor, drain, selection::resolve_field,
    value::complete_value,
};
use crate::response::{PatchCollector, ResponseValueId};

/// Runs deferred work in waves. Every deferral of a wave gets its own branch and is patched
/// before the next one starts. Deferrals found while resolving a wave form the next one.
pub(crate) struct DeferScheduler<'s, 'a, 'c> {
    scope: &'s Scope<'a>,
    collector: &'c mut dyn PatchCollector,
    queue: VecDeque<Deferral>,
    next_error_index: usize,
}

impl<'s, 'a, 'c> DeferScheduler<'s, 'a, 'c> {
    pub fn new(
        scope: &'s Scope<'a>,
        collector: &'c mut dyn PatchCollector,
        deferrals: Vec<Deferral>,
        initial_error_count: usize,
    ) -> Self {
        Self {
            scope,
            collector,
            queue: deferrals.into(),
            next_error_index: initial_error_count,
        }
    }

    pub async fn run(mut self) {
        let mut wave = 0;
        while !self.queue.is_empty() {
            wave += 1;
            let deferrals = std::mem::take(&mut self.queue);
            tracing::debug!(wave, deferrals = deferrals.len(), "Resolving deferred wave");
            for deferral in deferrals {
                match deferral {
                    Deferral::Field { parent, nodes } => {
                        let key = self.scope.operation[nodes[0]].response_key.clone();
                        let path = parent.field_path(&key);
                        let mut branch = ExecutionBranch::default();
                        let result = match resolve_field(self.scope, &mut branch, &parent, &nodes, ResponseValueId::Root) {
                            Ok(()) => drain(self.scope, &mut branch).await,
                            Err(err) => Err(err),
                        };
                        self.finish(branch, &path, result);
                    }
                    Deferral::Stream(stream) => self.next_stream_item(stream).await,
                }
            }
        }
    }

    /// Resolves one more item of the stream, which then waits for the next wave.
    async fn next_stream_item(&mut self, mut stream: StreamDescriptor) {
        let Some(item) = stream.items.next_item() else {
            tracing::trace!(items = stream.next_index, "Stream exhausted");
            return;
        };
        let frame = stream.frame.item(stream.next_index, &stream.item_type);
        stream.next_index += 1;

        let mut branch = ExecutionBranch::default();
        let result = match complete_value(self.scope, &mut branch, &frame, item, ResponseValueId::Root) {
            Ok(()) => drain(self.scope, &mut branch).await,
            Err(err) => Err(err),
        };
        self.finish(branch, &frame.path, result);
        self.queue.push_back(Deferral::Stream(stream));
    }

    /// Patches the value unless it is null, then every error. A failed deferral only reports its
    /// errors and its own deferrals are dropped.
    fn finish(&mut self, branch: ExecutionBranch, path: &Path, result: ExecutionResult<()>) {
        let (tree, errors, deferrals) = branch.into_parts();
        match result {
            Ok(()) => {
                let value = tree.to_json();
                if !value.is_null() {
                    let path = std::iter::once(ErrorPathSegment::Field("data".into()))
                        .chain(path.iter().cloned())
                        .collect::<Vec<_>>();
                    self.collector.patch(&path, value);
                }
                self.patch_errors(errors);
                self.queue.extend(deferrals);
            }
            Err(err) => {
                tracing::warn!("Deferred resolution failed: {err}");
                self.patch_errors(errors);
                self.patch_errors([GraphqlError::from(err)]);
            }
        }
    }

    fn patch_errors(&mut self, errors: impl IntoIterator<Item = GraphqlError>) {
        for error in errors {
            let path = [
                ErrorPathSegment::Field("errors".into()),
                ErrorPathSegment::Index(self.next_error_index),
            ];
            self.collector.patch(&path, error.to_json());
            self.next_error_index += 1;
        }
    }
}
