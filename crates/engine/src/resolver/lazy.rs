use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, Mutex, OnceLock},
};

use error::GraphqlError;

use super::ResolvedValue;

type Compute = Box<dyn FnOnce() -> ResolvedValue + Send>;

/// A value computed on first access and memoized afterwards.
///
/// Clones share the same computation, so forcing any of them runs it at most once. Errors are
/// stored like any other value: a computation returning [`ResolvedValue::Error`] is not retried.
/// A panicking computation is memoized as an internal error.
#[derive(Clone)]
pub struct LazyValue(Arc<LazyInner>);

struct LazyInner {
    value: OnceLock<ResolvedValue>,
    compute: Mutex<Option<Compute>>,
}

impl LazyValue {
    pub fn new(compute: impl FnOnce() -> ResolvedValue + Send + 'static) -> Self {
        LazyValue(Arc::new(LazyInner {
            value: OnceLock::new(),
            compute: Mutex::new(Some(Box::new(compute))),
        }))
    }

    /// An already resolved value.
    pub fn ready(value: impl Into<ResolvedValue>) -> Self {
        let lazy = LazyValue(Arc::new(LazyInner {
            value: OnceLock::new(),
            compute: Mutex::new(None),
        }));
        let _ = lazy.0.value.set(value.into());
        lazy
    }

    pub fn is_resolved(&self) -> bool {
        self.0.value.get().is_some()
    }

    /// Forces the computation. A computation returning another lazy value is forced as well,
    /// so the result is never [`ResolvedValue::Lazy`].
    pub fn value(&self) -> ResolvedValue {
        self.0
            .value
            .get_or_init(|| {
                let compute = self.0.compute.lock().ok().and_then(|mut compute| compute.take());
                match compute.map(|compute| catch_unwind(AssertUnwindSafe(compute))) {
                    Some(Ok(ResolvedValue::Lazy(inner))) => inner.value(),
                    Some(Ok(value)) => value,
                    Some(Err(_)) => {
                        tracing::error!("Lazy value computation panicked");
                        ResolvedValue::Error(GraphqlError::internal_server_error())
                    }
                    None => ResolvedValue::Error(GraphqlError::internal_server_error()),
                }
            })
            .clone()
    }

    /// A new lazy value applying `transform` to this one's result, without forcing either.
    pub fn then(&self, transform: impl FnOnce(ResolvedValue) -> ResolvedValue + Send + 'static) -> LazyValue {
        let this = self.clone();
        LazyValue::new(move || transform(this.value()))
    }
}

impl std::fmt::Debug for LazyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.value.get() {
            Some(value) => f.debug_tuple("LazyValue").field(value).finish(),
            None => f.write_str("LazyValue(<pending>)"),
        }
    }
}

type Items = Box<dyn Iterator<Item = ResolvedValue> + Send>;

/// A list produced one element at a time. Elements are only pulled when the engine needs them,
/// which with `@stream` means one element per delivery wave.
#[derive(Clone)]
pub struct ValueIter(Arc<Mutex<Items>>);

impl ValueIter {
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = ResolvedValue>,
        I::IntoIter: Send + 'static,
    {
        ValueIter(Arc::new(Mutex::new(Box::new(items.into_iter()))))
    }

    pub(crate) fn next_item(&self) -> Option<ResolvedValue> {
        self.0.lock().ok().and_then(|mut items| items.next())
    }

    pub(crate) fn collect_remaining(&self) -> Vec<ResolvedValue> {
        std::iter::from_fn(|| self.next_item()).collect()
    }
}

impl std::fmt::Debug for ValueIter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ValueIter")
    }
}
