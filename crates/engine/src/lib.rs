//! GraphQL execution engine.
//!
//! Executes operations against a [`Schema`] with user provided resolvers. Resolvers may return
//! plain JSON values, lazy values forced when the engine needs them, or loads batched across
//! every field requesting the same loader. Fields marked with `@defer` and lists marked with
//! `@stream` are delivered as patches after the initial result.

#![deny(clippy::future_not_send)]

mod config;
mod engine;
mod execution;
mod resolver;
mod response;

pub use config::*;
pub use engine::{Engine, EngineBuildError, EngineBuilder, Request};
pub use error::{ErrorCode, ErrorPath, GraphqlError};
pub use execution::ExecutionError;
pub use resolver::{BatchKey, BatchLoad, BatchLoader, LazyValue, LoadedBatch, ResolvedValue, ResolverContext, ValueIter};
pub use response::{
    ChannelCollector, InitialResponseCollector, MergedCollector, Patch, PatchCollector, PathSegment, Response,
};
pub use schema::Schema;
