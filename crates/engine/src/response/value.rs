use operation::ResponseKey;
use serde_json::Value;

use super::{ResponseListId, ResponseValueId};

#[derive(Debug)]
pub(crate) struct ResponseObject {
    pub(super) fields: Vec<ResponseField>,
    /// Set once a non-null field of this object became null. Permanent: the object is replaced
    /// by null in its owner, or the invalidity moves further up.
    pub(super) invalid_null: bool,
    pub(super) owner: Option<ResponseValueId>,
}

#[derive(Debug, Clone)]
pub(crate) struct ResponseField {
    pub key: ResponseKey,
    pub value: ResponseValue,
}

#[derive(Debug)]
pub(crate) struct ResponseList {
    pub(super) items: Vec<ResponseValue>,
    pub(super) invalid_null: bool,
    pub(super) owner: Option<ResponseValueId>,
}

/// A value in the response arena. Composite values are stored separately and referenced by id,
/// so null propagation can walk up through the owner ids without back-pointers.
#[derive(Default, Debug, Clone)]
pub(crate) enum ResponseValue {
    #[default]
    Pending,
    Null,
    Leaf(Value),
    List {
        id: ResponseListId,
    },
    Object {
        id: super::ResponseObjectId,
    },
}
