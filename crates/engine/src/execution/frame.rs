use std::sync::Arc;

use error::{ErrorPath, ErrorPathSegment};
use operation::{ResponseKey, SelectionNodeId};
use schema::{FieldDefinitionId, Type, TypeDefinitionId};
use serde_json::Value;

pub(crate) type Path = im::Vector<ErrorPathSegment>;

/// An object being resolved: the selection nodes whose sub-selections apply, the concrete object
/// type and the runtime value. Frames are never mutated, children are built from their parent.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    /// Fields whose selection sets are merged for this object. Empty for the operation root.
    pub nodes: Arc<[SelectionNodeId]>,
    pub path: Path,
    pub object_id: TypeDefinitionId,
    pub value: Arc<Value>,
}

impl Frame {
    pub fn root(object_id: TypeDefinitionId, value: Value) -> Self {
        Frame {
            nodes: Arc::from(Vec::new()),
            path: Path::new(),
            object_id,
            value: Arc::new(value),
        }
    }

    pub fn field_path(&self, key: &ResponseKey) -> Path {
        let mut path = self.path.clone();
        path.push_back(ErrorPathSegment::Field(key.clone()));
        path
    }
}

/// A field value being completed against its declared type, possibly an item of a list.
#[derive(Debug, Clone)]
pub(crate) struct ValueFrame {
    pub nodes: Arc<[SelectionNodeId]>,
    pub path: Path,
    pub ty: Type,
    pub parent_type: TypeDefinitionId,
    pub field_id: FieldDefinitionId,
    /// Whether the value is the field value itself rather than one of its list items,
    /// only those may be streamed.
    pub is_field_value: bool,
}

impl ValueFrame {
    pub fn with_type(&self, ty: &Type) -> Self {
        ValueFrame {
            ty: ty.clone(),
            ..self.clone()
        }
    }

    pub fn item(&self, index: usize, ty: &Type) -> Self {
        let mut path = self.path.clone();
        path.push_back(ErrorPathSegment::Index(index));
        ValueFrame {
            nodes: self.nodes.clone(),
            path,
            ty: ty.clone(),
            parent_type: self.parent_type,
            field_id: self.field_id,
            is_field_value: false,
        }
    }

    pub fn error_path(&self) -> ErrorPath {
        self.path.iter().cloned().collect()
    }
}
