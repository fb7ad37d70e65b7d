use std::{collections::VecDeque, sync::Arc};

use error::GraphqlError;
use operation::SelectionNodeId;
use schema::Type;

use super::{BatchAccumulator, Frame, ValueFrame};
use crate::{
    resolver::{LazyValue, ValueIter},
    response::{ResponseListId, ResponseObjectId, ResponseTree, ResponseValueId},
};

/// Where a value that is not available yet must be written once it is.
pub(crate) struct Continuation {
    pub frame: ValueFrame,
    pub slot: ResponseValueId,
}

pub(crate) enum Deferral {
    /// A `@defer`red field of an already resolved object.
    Field { parent: Frame, nodes: Arc<[SelectionNodeId]> },
    Stream(StreamDescriptor),
}

/// A `@stream`ed list, resolved one item per deferred wave.
pub(crate) struct StreamDescriptor {
    pub items: ValueIter,
    pub next_index: usize,
    /// Frame of the list field itself.
    pub frame: ValueFrame,
    pub item_type: Type,
}

/// Response value a deferral was found in. Deferrals of values that ended up replaced by null
/// are dropped.
enum DeferralOrigin {
    Object(ResponseObjectId),
    List(ResponseListId),
}

/// Everything produced while resolving one frame: the response tree, its errors, the work
/// waiting on lazy values and batches and the deferrals for the next waves.
#[derive(Default)]
pub(crate) struct ExecutionBranch {
    pub tree: ResponseTree,
    pub lazies: VecDeque<(LazyValue, Continuation)>,
    pub batches: BatchAccumulator<Continuation>,
    errors: Vec<GraphqlError>,
    deferrals: Vec<(DeferralOrigin, Deferral)>,
}

impl ExecutionBranch {
    /// Records an error unless one was already recorded for the same path.
    pub fn push_error(&mut self, error: GraphqlError) {
        if error.path.is_some() && self.errors.iter().any(|existing| existing.path == error.path) {
            tracing::trace!("Ignoring duplicate error: {error}");
            return;
        }
        self.errors.push(error);
    }

    pub fn defer_field(&mut self, object_id: ResponseObjectId, parent: Frame, nodes: Arc<[SelectionNodeId]>) {
        self.deferrals
            .push((DeferralOrigin::Object(object_id), Deferral::Field { parent, nodes }));
    }

    pub fn defer_stream(&mut self, list_id: ResponseListId, stream: StreamDescriptor) {
        self.deferrals
            .push((DeferralOrigin::List(list_id), Deferral::Stream(stream)));
    }

    /// Splits a drained branch, keeping only the deferrals still part of the response.
    pub fn into_parts(self) -> (ResponseTree, Vec<GraphqlError>, Vec<Deferral>) {
        let ExecutionBranch {
            tree, errors, deferrals, ..
        } = self;
        let deferrals = deferrals
            .into_iter()
            .filter(|(origin, _)| match origin {
                DeferralOrigin::Object(id) => tree.is_object_live(*id),
                DeferralOrigin::List(id) => tree.is_list_live(*id),
            })
            .map(|(_, deferral)| deferral)
            .collect();
        (tree, errors, deferrals)
    }
}
