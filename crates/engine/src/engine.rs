mod builder;
mod request;

use std::sync::Arc;

pub use builder::*;
use error::{ErrorCode, ErrorCodeCounter, GraphqlError};
use itertools::Itertools;
use operation::{Operation, OperationType, Variables};
pub use request::*;
use schema::Schema;
use tracing::Instrument;

use crate::{
    ExecutionConfig,
    execution::{DeferScheduler, ExecutionBranch, ExecutionError, Frame, Scope, execute_root},
    resolver::Resolvers,
    response::{InitialResponseCollector, PatchCollector, Response},
};

pub struct Engine {
    pub(crate) schema: Arc<Schema>,
    pub(crate) resolvers: Resolvers,
    pub(crate) config: ExecutionConfig,
}

impl Engine {
    /// An engine resolving every field from the property of the same name on its parent value.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            resolvers: Resolvers::default(),
            config: ExecutionConfig::default(),
        }
    }

    pub fn builder(schema: Arc<Schema>) -> EngineBuilder {
        EngineBuilder::new(schema)
    }

    #[must_use]
    pub fn with_config(mut self, config: ExecutionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Executes a request and returns its initial result. Deferred fields are absent and
    /// streamed lists empty, deferred work is never run.
    pub async fn execute(&self, request: Request) -> Result<Response, ExecutionError> {
        let mut collector = InitialResponseCollector::default();
        self.execute_with_collector(request, &mut collector).await
    }

    /// Executes a request, sending the initial result and then every deferred patch to the
    /// collector. The returned response is the initial result.
    ///
    /// Errors are only returned for contract violations of resolvers and loaders, everything
    /// else is reported in the response.
    pub async fn execute_with_collector(
        &self,
        request: Request,
        collector: &mut dyn PatchCollector,
    ) -> Result<Response, ExecutionError> {
        let span = tracing::debug_span!("execute", operation_name = request.operation_name.as_deref());
        self.execute_inner(request, collector).instrument(span).await
    }

    async fn execute_inner(
        &self,
        request: Request,
        collector: &mut dyn PatchCollector,
    ) -> Result<Response, ExecutionError> {
        let Request {
            document,
            operation_name,
            variables,
            root_value,
            context,
        } = request;

        let operation = match Operation::parse(&self.schema, operation_name.as_deref(), &document) {
            Ok(operation) => operation,
            Err(errors) => return Ok(request_errors(errors.into_iter().map(Into::into).collect(), collector)),
        };
        if operation.ty == OperationType::Subscription {
            let error = GraphqlError::new(
                "Subscriptions are not supported, only queries and mutations can be executed",
                ErrorCode::OperationValidationError,
            )
            .with_location(operation.location);
            return Ok(request_errors(vec![error], collector));
        }
        let variables = match Variables::bind(&self.schema, &operation, variables) {
            Ok(variables) => variables,
            Err(errors) => return Ok(request_errors(errors.into_iter().map(Into::into).collect(), collector)),
        };

        let scope = Scope {
            schema: &self.schema,
            operation: &operation,
            variables: &variables,
            resolvers: &self.resolvers,
            context: &context,
            config: &self.config,
        };
        let mut branch = ExecutionBranch::default();
        let frame = Frame::root(operation.root_object_id, root_value);
        if let Err(err) = execute_root(&scope, &mut branch, frame).await {
            tracing::error!("Execution failed: {err}");
            return Err(err);
        }

        let (tree, errors, deferrals) = branch.into_parts();
        let response = Response {
            data: Some(tree.to_json()),
            errors,
        };
        log_errors(&response.errors);
        collector.patch(&[], response.to_json());

        if !deferrals.is_empty() {
            if collector.wants_incremental() {
                DeferScheduler::new(&scope, collector, deferrals, response.errors.len())
                    .run()
                    .await;
            } else {
                tracing::debug!(
                    deferrals = deferrals.len(),
                    "Collector does not accept patches, skipping deferred work"
                );
            }
        }

        Ok(response)
    }
}

fn request_errors(errors: Vec<GraphqlError>, collector: &mut dyn PatchCollector) -> Response {
    tracing::debug!(
        "Operation could not be executed: {}",
        errors.iter().map(|err| err.message.as_ref()).join(", ")
    );
    let response = Response { data: None, errors };
    collector.patch(&[], response.to_json());
    response
}

fn log_errors(errors: &[GraphqlError]) {
    let counter = ErrorCodeCounter::from_errors(errors);
    if counter.count() > 0 {
        tracing::debug!(errors = counter.count(), "Execution errors: {:?}", counter.to_vec());
    }
}
