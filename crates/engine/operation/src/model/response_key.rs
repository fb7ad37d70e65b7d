use std::sync::Arc;

/// Position of a field in the operation document. Fields are numbered in the order they are
/// encountered, including inside fragments, so the response can restore document order after
/// merging selections coming from different type conditions.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct QueryPosition(pub(crate) u32);

/// The name under which a field appears in the response: its alias if any, its name otherwise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResponseKey(Arc<str>);

impl ResponseKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResponseKey {
    fn from(key: &str) -> Self {
        ResponseKey(key.into())
    }
}

impl From<String> for ResponseKey {
    fn from(key: String) -> Self {
        ResponseKey(key.into())
    }
}

impl std::ops::Deref for ResponseKey {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ResponseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for ResponseKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}
