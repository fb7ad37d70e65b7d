use operation::ResponseKey;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Default)]
pub struct ErrorPath(Vec<ErrorPathSegment>);

impl std::ops::Deref for ErrorPath {
    type Target = Vec<ErrorPathSegment>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for ErrorPath {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<ErrorPathSegment> for ErrorPath {
    fn from_iter<I: IntoIterator<Item = ErrorPathSegment>>(iter: I) -> Self {
        ErrorPath(iter.into_iter().collect())
    }
}

impl serde::Serialize for ErrorPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.0.iter())
    }
}

/// A segment of a response path: either an object key or a list index.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub enum ErrorPathSegment {
    Field(ResponseKey),
    Index(usize),
}

impl serde::Serialize for ErrorPathSegment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            ErrorPathSegment::Field(key) => serializer.serialize_str(key.as_str()),
            ErrorPathSegment::Index(index) => serializer.serialize_u64(*index as u64),
        }
    }
}

impl From<&ErrorPathSegment> for serde_json::Value {
    fn from(segment: &ErrorPathSegment) -> Self {
        match segment {
            ErrorPathSegment::Field(key) => serde_json::Value::String(key.to_string()),
            ErrorPathSegment::Index(index) => serde_json::Value::from(*index),
        }
    }
}

impl std::fmt::Display for ErrorPathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorPathSegment::Field(key) => f.write_str(key.as_str()),
            ErrorPathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<Vec<ErrorPathSegment>> for ErrorPath {
    fn from(segments: Vec<ErrorPathSegment>) -> Self {
        ErrorPath(segments)
    }
}
