use std::sync::Arc;

use error::GraphqlError;
use indexmap::IndexMap;
use itertools::Itertools;
use serde_json::Value;

use super::{ExecutionError, ExecutionResult};
use crate::{
    SchedulingPolicy,
    resolver::{BatchKey, BatchLoad, BatchLoader, LoadedBatch, LoaderId, ResolvedValue, Transform},
};

/// Pending batch loads of one execution branch, grouped by loader and shared arguments.
///
/// Every waiter records where the loaded value must go. Flushing takes the whole storage, so
/// loads registered while the results are processed belong to the next generation.
pub(crate) struct BatchAccumulator<T> {
    groups: IndexMap<(LoaderId, BatchKey), BatchGroup<T>>,
}

struct BatchGroup<T> {
    loader: Arc<dyn BatchLoader>,
    shared: Value,
    items: IndexMap<BatchKey, BatchItem<T>>,
}

struct BatchItem<T> {
    key: Value,
    /// Number of flushes this key already went through without being returned.
    attempts: usize,
    waiters: Vec<(T, Option<Transform>)>,
}

impl<T> Default for BatchAccumulator<T> {
    fn default() -> Self {
        Self {
            groups: IndexMap::new(),
        }
    }
}

impl<T: Send + Sync> BatchAccumulator<T> {
    pub fn register(&mut self, load: BatchLoad, waiter: T) {
        let BatchLoad {
            loader,
            shared,
            key,
            transform,
        } = load;
        self.insert(loader, shared, key, 0, vec![(waiter, transform)]);
    }

    fn insert(
        &mut self,
        loader: Arc<dyn BatchLoader>,
        shared: Value,
        key: Value,
        attempts: usize,
        waiters: Vec<(T, Option<Transform>)>,
    ) {
        let group = self
            .groups
            .entry((LoaderId::of(&loader), BatchKey::from(&shared)))
            .or_insert_with(|| BatchGroup {
                loader,
                shared,
                items: IndexMap::new(),
            });
        let item = group.items.entry(BatchKey::from(&key)).or_insert_with(|| BatchItem {
            key,
            attempts,
            waiters: Vec::new(),
        });
        item.attempts = item.attempts.max(attempts);
        item.waiters.extend(waiters);
    }

    pub fn any(&self) -> bool {
        !self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Names of the loaders with pending keys, in registration order and without duplicates.
    pub fn pending_loaders(&self) -> String {
        self.groups.values().map(|group| group.loader.name()).unique().join(", ")
    }

    pub fn pending_keys(&self) -> String {
        self.groups
            .values()
            .flat_map(|group| group.items.values().map(|item| &item.key))
            .join(", ")
    }

    /// Calls every loader once with all the keys registered for it and returns the value of
    /// every waiter, transforms applied. Keys a loader did not return are registered again
    /// unless they already went through `max_generations` flushes.
    pub async fn resolve_all(
        &mut self,
        policy: SchedulingPolicy,
        max_generations: usize,
    ) -> ExecutionResult<Vec<(T, ResolvedValue)>> {
        let groups = std::mem::take(&mut self.groups);
        let loaded = match policy {
            SchedulingPolicy::Sequential => {
                let mut loaded = Vec::with_capacity(groups.len());
                for group in groups.into_values() {
                    let result = load(&group).await;
                    loaded.push((group, result));
                }
                loaded
            }
            SchedulingPolicy::Concurrent => {
                futures_util::future::join_all(groups.into_values().map(|group| async move {
                    let result = load(&group).await;
                    (group, result)
                }))
                .await
            }
        };

        let mut resolved = Vec::new();
        for (group, result) in loaded {
            let BatchGroup { loader, shared, items } = group;
            let mut exhausted = Vec::new();
            for (key_id, item) in items {
                let value = match &result {
                    Ok(batch) => batch.get(&key_id).cloned(),
                    Err(err) => Some(ResolvedValue::Error(err.clone())),
                };
                match value {
                    Some(value) => {
                        for (waiter, transform) in item.waiters {
                            let value = match &transform {
                                Some(transform) => transform(value.clone()),
                                None => value.clone(),
                            };
                            resolved.push((waiter, value));
                        }
                    }
                    None if item.attempts + 1 >= max_generations => exhausted.push(item),
                    None => {
                        tracing::trace!(loader = loader.name(), key = %key_id, "Key missing from batch, retrying");
                        self.insert(loader.clone(), shared.clone(), item.key, item.attempts + 1, item.waiters);
                    }
                }
            }
            if !exhausted.is_empty() {
                let err = ExecutionError::LoaderExhausted {
                    loader: loader.name().to_string(),
                    keys: exhausted.iter().map(|item| &item.key).join(", "),
                    attempts: exhausted.iter().map(|item| item.attempts + 1).max().unwrap_or_default(),
                };
                tracing::error!("{err}");
                return Err(err);
            }
        }
        Ok(resolved)
    }
}

async fn load<T>(group: &BatchGroup<T>) -> Result<LoadedBatch, GraphqlError> {
    let keys = group.items.values().map(|item| item.key.clone()).collect::<Vec<_>>();
    tracing::debug!(loader = group.loader.name(), keys = keys.len(), "Loading batch");
    let result = group.loader.load(&group.shared, &keys).await;
    if let Err(err) = &result {
        tracing::debug!(loader = group.loader.name(), "Batch load failed: {err}");
    }
    result
}
