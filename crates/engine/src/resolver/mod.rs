//! Resolver protocol: what field resolvers return and how the engine finds them.

mod batch;
mod lazy;

use std::sync::Arc;

pub use batch::*;
use error::GraphqlError;
use fxhash::FxHashMap;
pub use lazy::*;
use schema::{FieldDefinition, FieldDefinitionId, TypeDefinitionId};
use serde_json::{Map, Value};

/// Result of a field resolver.
#[derive(Debug, Clone)]
pub enum ResolvedValue {
    Value(Value),
    /// A list whose elements may themselves be lazy, batched or errors.
    List(Vec<ResolvedValue>),
    Iter(ValueIter),
    Lazy(LazyValue),
    Batch(BatchLoad),
    Error(GraphqlError),
}

impl ResolvedValue {
    pub fn null() -> Self {
        ResolvedValue::Value(Value::Null)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResolvedValue::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ResolvedValue::Value(Value::Null))
    }
}

impl From<Value> for ResolvedValue {
    fn from(value: Value) -> Self {
        ResolvedValue::Value(value)
    }
}

impl From<Vec<ResolvedValue>> for ResolvedValue {
    fn from(items: Vec<ResolvedValue>) -> Self {
        ResolvedValue::List(items)
    }
}

impl From<ValueIter> for ResolvedValue {
    fn from(items: ValueIter) -> Self {
        ResolvedValue::Iter(items)
    }
}

impl From<LazyValue> for ResolvedValue {
    fn from(lazy: LazyValue) -> Self {
        ResolvedValue::Lazy(lazy)
    }
}

impl From<BatchLoad> for ResolvedValue {
    fn from(load: BatchLoad) -> Self {
        ResolvedValue::Batch(load)
    }
}

impl From<GraphqlError> for ResolvedValue {
    fn from(err: GraphqlError) -> Self {
        ResolvedValue::Error(err)
    }
}

impl<T: Into<ResolvedValue>, E: Into<GraphqlError>> From<Result<T, E>> for ResolvedValue {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => value.into(),
            Err(err) => ResolvedValue::Error(err.into()),
        }
    }
}

/// Everything a field resolver can look at.
#[derive(Clone, Copy)]
pub struct ResolverContext<'a> {
    /// Runtime value of the object owning the field.
    pub parent: &'a Value,
    pub parent_type: &'a str,
    pub field: &'a FieldDefinition,
    /// Coerced arguments, defaults included.
    pub arguments: &'a Map<String, Value>,
    /// Request context, shared by every resolver of an execution.
    pub context: &'a Value,
}

impl<'a> ResolverContext<'a> {
    pub fn argument(&self, name: &str) -> Option<&'a Value> {
        self.arguments.get(name)
    }
}

pub(crate) type ResolverFn = Arc<dyn Fn(ResolverContext<'_>) -> ResolvedValue + Send + Sync>;
pub(crate) type BatchKeysFn = Arc<dyn Fn(ResolverContext<'_>) -> (Value, Value) + Send + Sync>;
pub(crate) type TypeResolverFn = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;
pub(crate) type ScalarCoercionFn = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum FieldResolver {
    Function(ResolverFn),
    /// Fields fetched through a loader, the function computes `(shared, key)`.
    Batched {
        loader: Arc<dyn BatchLoader>,
        keys: BatchKeysFn,
    },
}

/// Field resolvers, abstract type resolvers and custom scalar coercions of an engine.
#[derive(Clone, Default)]
pub(crate) struct Resolvers {
    fields: FxHashMap<FieldDefinitionId, FieldResolver>,
    type_resolvers: FxHashMap<TypeDefinitionId, TypeResolverFn>,
    scalars: FxHashMap<TypeDefinitionId, ScalarCoercionFn>,
}

impl Resolvers {
    pub(crate) fn insert_field(&mut self, id: FieldDefinitionId, resolver: FieldResolver) {
        self.fields.insert(id, resolver);
    }

    pub(crate) fn insert_type_resolver(&mut self, id: TypeDefinitionId, resolver: TypeResolverFn) {
        self.type_resolvers.insert(id, resolver);
    }

    pub(crate) fn insert_scalar(&mut self, id: TypeDefinitionId, coercion: ScalarCoercionFn) {
        self.scalars.insert(id, coercion);
    }

    /// Resolves a field. Resolvers registered on the concrete object field take precedence over
    /// the ones of the interface field the selection was bound to. Fields without any resolver
    /// read the property of the same name on the parent value.
    pub(crate) fn resolve(
        &self,
        field_id: FieldDefinitionId,
        bound_field_id: FieldDefinitionId,
        ctx: ResolverContext<'_>,
    ) -> ResolvedValue {
        let resolver = self.fields.get(&field_id).or_else(|| self.fields.get(&bound_field_id));
        match resolver {
            Some(FieldResolver::Function(resolve)) => resolve(ctx),
            Some(FieldResolver::Batched { loader, keys }) => {
                let (shared, key) = keys(ctx);
                ResolvedValue::Batch(BatchLoad::new(loader.clone(), shared, key))
            }
            None => ctx
                .parent
                .get(ctx.field.name.as_str())
                .cloned()
                .unwrap_or_default()
                .into(),
        }
    }

    /// Name of the concrete object type of a value of an abstract type, read from `__typename`
    /// unless a type resolver was registered.
    pub(crate) fn resolve_type_name(&self, abstract_type: TypeDefinitionId, value: &Value) -> Option<String> {
        match self.type_resolvers.get(&abstract_type) {
            Some(resolve) => resolve(value),
            None => value.get("__typename")?.as_str().map(str::to_owned),
        }
    }

    pub(crate) fn scalar_coercion(&self, id: TypeDefinitionId) -> Option<&ScalarCoercionFn> {
        self.scalars.get(&id)
    }
}
