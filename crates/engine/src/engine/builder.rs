use std::sync::Arc;

use schema::{Schema, TypeDefinition, TypeDefinitionId};
use serde_json::Value;

use super::Engine;
use crate::{
    ExecutionConfig,
    resolver::{BatchLoader, FieldResolver, ResolvedValue, ResolverContext, Resolvers},
};

#[derive(Debug, thiserror::Error)]
pub enum EngineBuildError {
    #[error("Unknown type '{0}'")]
    UnknownType(String),
    #[error("Type '{type_name}' does not have a field named '{field_name}'")]
    UnknownField { type_name: String, field_name: String },
    #[error("Type '{0}' is neither an interface nor a union")]
    NotAnAbstractType(String),
    #[error("Type '{0}' is not a scalar")]
    NotAScalar(String),
}

/// Registers resolvers by type and field name. Names are checked against the schema when the
/// engine is built.
pub struct EngineBuilder {
    schema: Arc<Schema>,
    resolvers: Resolvers,
    config: ExecutionConfig,
    errors: Vec<EngineBuildError>,
}

impl EngineBuilder {
    pub(super) fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            resolvers: Resolvers::default(),
            config: ExecutionConfig::default(),
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn resolver<F>(mut self, type_name: &str, field_name: &str, resolver: F) -> Self
    where
        F: Fn(ResolverContext<'_>) -> ResolvedValue + Send + Sync + 'static,
    {
        if let Some(field_id) = self.field_id(type_name, field_name) {
            self.resolvers
                .insert_field(field_id, FieldResolver::Function(Arc::new(resolver)));
        }
        self
    }

    /// Resolves a field through a batch loader, `keys` computes the `(shared, key)` pair of
    /// each occurrence. Occurrences with the same shared value are loaded together.
    #[must_use]
    pub fn batched<K>(mut self, type_name: &str, field_name: &str, loader: Arc<dyn BatchLoader>, keys: K) -> Self
    where
        K: Fn(ResolverContext<'_>) -> (Value, Value) + Send + Sync + 'static,
    {
        if let Some(field_id) = self.field_id(type_name, field_name) {
            self.resolvers.insert_field(
                field_id,
                FieldResolver::Batched {
                    loader,
                    keys: Arc::new(keys),
                },
            );
        }
        self
    }

    /// Determines the object type name of values of an interface or union, replacing the
    /// `__typename` lookup.
    #[must_use]
    pub fn type_resolver<F>(mut self, type_name: &str, resolver: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        match self.type_id(type_name) {
            Some(id) if self.schema[id].is_abstract() => self.resolvers.insert_type_resolver(id, Arc::new(resolver)),
            Some(_) => self.errors.push(EngineBuildError::NotAnAbstractType(type_name.to_string())),
            None => {}
        }
        self
    }

    /// Output coercion of a scalar, replacing the built-in one or the pass-through of custom
    /// scalars. Errors become field errors.
    #[must_use]
    pub fn scalar<F>(mut self, type_name: &str, coerce: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        match self.type_id(type_name) {
            Some(id) if matches!(self.schema[id], TypeDefinition::Scalar(_)) => {
                self.resolvers.insert_scalar(id, Arc::new(coerce))
            }
            Some(_) => self.errors.push(EngineBuildError::NotAScalar(type_name.to_string())),
            None => {}
        }
        self
    }

    #[must_use]
    pub fn config(mut self, config: ExecutionConfig) -> Self {
        self.config = config;
        self
    }

    /// Fails with the first invalid registration.
    pub fn build(self) -> Result<Engine, EngineBuildError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }
        Ok(Engine {
            schema: self.schema,
            resolvers: self.resolvers,
            config: self.config,
        })
    }

    fn type_id(&mut self, type_name: &str) -> Option<TypeDefinitionId> {
        let id = self.schema.type_by_name(type_name);
        if id.is_none() {
            self.errors.push(EngineBuildError::UnknownType(type_name.to_string()));
        }
        id
    }

    fn field_id(&mut self, type_name: &str, field_name: &str) -> Option<schema::FieldDefinitionId> {
        let type_id = self.type_id(type_name)?;
        let field_id = self.schema.field(type_id, field_name);
        if field_id.is_none() {
            self.errors.push(EngineBuildError::UnknownField {
                type_name: type_name.to_string(),
                field_name: field_name.to_string(),
            });
        }
        field_id
    }
}
