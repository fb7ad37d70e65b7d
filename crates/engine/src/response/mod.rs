mod patch;
mod path;
mod tree;
mod value;

pub use patch::*;
pub(crate) use path::*;
pub(crate) use tree::*;
pub(crate) use value::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ResponseObjectId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ResponseListId(u32);

impl From<usize> for ResponseObjectId {
    fn from(index: usize) -> Self {
        Self(index as u32)
    }
}

impl From<ResponseObjectId> for usize {
    fn from(id: ResponseObjectId) -> usize {
        id.0 as usize
    }
}

impl From<usize> for ResponseListId {
    fn from(index: usize) -> Self {
        Self(index as u32)
    }
}

impl From<ResponseListId> for usize {
    fn from(id: ResponseListId) -> usize {
        id.0 as usize
    }
}

/// Initial result of an execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// `None` if the operation could not be executed at all, `Some(Value::Null)` if a null
    /// propagated up to the root.
    pub data: Option<serde_json::Value>,
    pub errors: Vec<error::GraphqlError>,
}

impl Response {
    /// The `{"data": ..., "errors": [...]}` document, `errors` being absent when empty.
    pub fn to_json(&self) -> serde_json::Value {
        let mut response = serde_json::Map::new();
        if let Some(data) = &self.data {
            response.insert("data".to_string(), data.clone());
        }
        if !self.errors.is_empty() {
            response.insert(
                "errors".to_string(),
                self.errors.iter().map(error::GraphqlError::to_json).collect(),
            );
        }
        serde_json::Value::Object(response)
    }
}
