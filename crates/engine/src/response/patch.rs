use futures::channel::mpsc::UnboundedSender;
use serde_json::{Map, Value};

pub use error::ErrorPathSegment as PathSegment;

/// Receives the response of an execution: first the initial result at the empty path with
/// `{"data": ..., "errors": [...]}`, then one patch per deferred field or streamed item at
/// `["data", ...]` and one per deferred error at `["errors", N]`.
pub trait PatchCollector: Send {
    fn patch(&mut self, path: &[PathSegment], value: Value);

    /// Collectors that cannot use anything after the initial result return false, deferred
    /// work is then never executed.
    fn wants_incremental(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Patch {
    pub path: Vec<PathSegment>,
    pub value: Value,
}

impl PatchCollector for Vec<Patch> {
    fn patch(&mut self, path: &[PathSegment], value: Value) {
        self.push(Patch {
            path: path.to_vec(),
            value,
        });
    }
}

/// Keeps the initial result and nothing else.
#[derive(Debug, Default)]
pub struct InitialResponseCollector {
    response: Option<Value>,
}

impl InitialResponseCollector {
    pub fn into_response(self) -> Option<Value> {
        self.response
    }
}

impl PatchCollector for InitialResponseCollector {
    fn patch(&mut self, path: &[PathSegment], value: Value) {
        if path.is_empty() {
            self.response = Some(value);
        }
    }

    fn wants_incremental(&self) -> bool {
        false
    }
}

/// Splices every patch into a single document, the response a client would have received
/// without incremental delivery.
#[derive(Debug, Default)]
pub struct MergedCollector {
    document: Value,
}

impl MergedCollector {
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn into_document(self) -> Value {
        self.document
    }
}

impl PatchCollector for MergedCollector {
    fn patch(&mut self, path: &[PathSegment], value: Value) {
        match path {
            [] => merge(&mut self.document, value),
            [PathSegment::Field(key), ..] if key.as_str() == "errors" => {
                let Some(document) = as_object(&mut self.document) else {
                    return;
                };
                match document.entry("errors").or_insert_with(|| Value::Array(Vec::new())) {
                    Value::Array(errors) => errors.push(value),
                    _ => tracing::debug!("Errors of the merged document are not a list"),
                }
            }
            path => insert_at(&mut self.document, path, value),
        }
    }
}

fn as_object(value: &mut Value) -> Option<&mut Map<String, Value>> {
    if value.is_null() {
        *value = Value::Object(Map::new());
    }
    value.as_object_mut()
}

fn insert_at(target: &mut Value, path: &[PathSegment], value: Value) {
    let Some((segment, rest)) = path.split_first() else {
        merge(target, value);
        return;
    };
    let child = match segment {
        PathSegment::Field(key) => match as_object(target) {
            Some(object) => object.entry(key.as_str()).or_insert(Value::Null),
            None => return,
        },
        PathSegment::Index(index) => {
            if target.is_null() {
                *target = Value::Array(Vec::new());
            }
            let Some(items) = target.as_array_mut() else {
                return;
            };
            if items.len() <= *index {
                items.resize(*index + 1, Value::Null);
            }
            &mut items[*index]
        }
    };
    insert_at(child, rest, value);
}

fn merge(target: &mut Value, value: Value) {
    match (target, value) {
        (Value::Object(target), Value::Object(value)) => {
            for (key, value) in value {
                merge(target.entry(key).or_insert(Value::Null), value);
            }
        }
        (target, value) => *target = value,
    }
}

/// Forwards patches to a channel, for callers consuming deferred results as they arrive.
#[derive(Debug)]
pub struct ChannelCollector {
    sender: UnboundedSender<Patch>,
}

impl ChannelCollector {
    pub fn new(sender: UnboundedSender<Patch>) -> Self {
        Self { sender }
    }
}

impl PatchCollector for ChannelCollector {
    fn patch(&mut self, path: &[PathSegment], value: Value) {
        let patch = Patch {
            path: path.to_vec(),
            value,
        };
        if self.sender.unbounded_send(patch).is_err() {
            tracing::debug!("Patch receiver was dropped");
        }
    }

    fn wants_incremental(&self) -> bool {
        !self.sender.is_closed()
    }
}
