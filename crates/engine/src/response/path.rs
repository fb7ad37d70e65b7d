use super::{ResponseListId, ResponseObjectId};

/// Unique identifier of a value slot within the response tree. Used to propagate null at the
/// right place. Slots know whether they accept null so propagation never has to look at the
/// schema again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResponseValueId {
    /// The value the whole tree resolves to, `data` for the initial response or the value of a
    /// deferred field or streamed item. Always accepts null.
    Root,
    Field {
        object_id: ResponseObjectId,
        index: u32,
        nullable: bool,
    },
    Index {
        list_id: ResponseListId,
        index: u32,
        nullable: bool,
    },
}

impl ResponseValueId {
    pub fn field(object_id: ResponseObjectId, index: usize, nullable: bool) -> Self {
        Self::Field {
            object_id,
            index: index as u32,
            nullable,
        }
    }

    pub fn index(list_id: ResponseListId, index: usize, nullable: bool) -> Self {
        Self::Index {
            list_id,
            index: index as u32,
            nullable,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            ResponseValueId::Root => true,
            ResponseValueId::Field { nullable, .. } => *nullable,
            ResponseValueId::Index { nullable, .. } => *nullable,
        }
    }
}

#[cfg(test)]
#[test]
fn response_value_id_size() {
    assert!(std::mem::size_of::<ResponseValueId>() <= 16);
}
