//! Execution of a bound operation.
//!
//! The driver resolves the root selection set into a response tree. Fields returning lazy values
//! or batch loads leave a pending slot behind. The driver then alternates between forcing lazy
//! values and flushing batches until neither has work left. Deferred fields and streamed lists
//! are collected along the way and resolved in later waves, each one in its own branch.

mod batch;
mod branch;
mod defer;
mod directives;
mod driver;
mod errors;
mod frame;
mod selection;
mod typecast;
mod value;

pub(crate) use batch::*;
pub(crate) use branch::*;
pub(crate) use defer::*;
pub(crate) use driver::*;
pub use errors::*;
pub(crate) use frame::*;

use operation::{Operation, Variables};
use schema::Schema;

use crate::{ExecutionConfig, resolver::Resolvers};

/// Read-only state shared by every frame of an execution.
pub(crate) struct Scope<'a> {
    pub schema: &'a Schema,
    pub operation: &'a Operation,
    pub variables: &'a Variables,
    pub resolvers: &'a Resolvers,
    pub context: &'a serde_json::Value,
    pub config: &'a ExecutionConfig,
}

impl Scope<'_> {
    /// Whether `@defer` and `@stream` are honored.
    pub fn incremental(&self) -> bool {
        self.config.incremental_delivery
    }
}
