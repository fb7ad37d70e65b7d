use std::sync::Arc;

use error::GraphqlError;
use fxhash::FxHashMap;
use serde_json::Value;

use super::ResolvedValue;

/// Loads many keys in a single call.
///
/// The engine calls [`BatchLoader::load`] once per flush generation for every distinct
/// `(loader, shared)` pair, with every distinct key requested during that generation. Keys absent
/// from the returned batch are requested again in the next generation.
#[async_trait::async_trait]
pub trait BatchLoader: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn load(&self, shared: &Value, keys: &[Value]) -> Result<LoadedBatch, GraphqlError>;
}

/// Canonical form of a key, JSON objects with the same entries in a different order are
/// different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchKey(String);

impl From<&Value> for BatchKey {
    fn from(value: &Value) -> Self {
        BatchKey(value.to_string())
    }
}

impl std::fmt::Display for BatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Results of one [`BatchLoader::load`] call.
#[derive(Debug, Default)]
pub struct LoadedBatch(FxHashMap<BatchKey, ResolvedValue>);

impl LoadedBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &Value, value: impl Into<ResolvedValue>) {
        self.0.insert(BatchKey::from(key), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn get(&self, key: &BatchKey) -> Option<&ResolvedValue> {
        self.0.get(key)
    }
}

impl<V: Into<ResolvedValue>> FromIterator<(Value, V)> for LoadedBatch {
    fn from_iter<T: IntoIterator<Item = (Value, V)>>(iter: T) -> Self {
        let mut batch = LoadedBatch::new();
        for (key, value) in iter {
            batch.insert(&key, value);
        }
        batch
    }
}

pub(crate) type Transform = Arc<dyn Fn(ResolvedValue) -> ResolvedValue + Send + Sync>;

/// A value that will be produced by a batch loader.
#[derive(Clone)]
pub struct BatchLoad {
    pub(crate) loader: Arc<dyn BatchLoader>,
    pub(crate) shared: Value,
    pub(crate) key: Value,
    pub(crate) transform: Option<Transform>,
}

impl BatchLoad {
    pub fn new(loader: Arc<dyn BatchLoader>, shared: Value, key: Value) -> Self {
        BatchLoad {
            loader,
            shared,
            key,
            transform: None,
        }
    }

    /// Applies `transform` to the loaded value once it is available.
    #[must_use]
    pub fn map(mut self, transform: impl Fn(ResolvedValue) -> ResolvedValue + Send + Sync + 'static) -> Self {
        self.transform = Some(match self.transform.take() {
            Some(previous) => Arc::new(move |value| transform(previous(value))),
            None => Arc::new(transform),
        });
        self
    }

    pub fn loader_name(&self) -> &str {
        self.loader.name()
    }
}

impl std::fmt::Debug for BatchLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchLoad")
            .field("loader", &self.loader.name())
            .field("shared", &self.shared)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Loaders are identified by the address of their shared allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct LoaderId(usize);

impl LoaderId {
    pub(crate) fn of(loader: &Arc<dyn BatchLoader>) -> Self {
        LoaderId(Arc::as_ptr(loader) as *const () as usize)
    }
}
