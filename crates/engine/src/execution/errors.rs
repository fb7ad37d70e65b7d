use std::borrow::Cow;

use error::{ErrorCode, ErrorPath, GraphqlError};

/// Contract violations halting the resolution of the current top-level or deferred frame.
/// User data errors never end up here, they become null plus an entry in `errors`.
#[derive(thiserror::Error, Debug)]
pub enum ExecutionError {
    #[error("Abstract type {abstract_type} must resolve to one of its possible types, got {resolved}")]
    UnresolvedType {
        abstract_type: String,
        resolved: String,
        path: ErrorPath,
    },
    #[error("Batch loader {loader} did not return keys {keys} after {attempts} attempts")]
    LoaderExhausted {
        loader: String,
        keys: String,
        attempts: usize,
    },
    #[error("Internal error: response value already has an owner")]
    OwnerAlreadySet,
    #[error("Internal error: {0}")]
    Internal(Cow<'static, str>),
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;

impl From<ExecutionError> for GraphqlError {
    fn from(err: ExecutionError) -> Self {
        let message = err.to_string();
        match err {
            ExecutionError::UnresolvedType { path, .. } => {
                GraphqlError::new(message, ErrorCode::UnresolvedType).with_path(path)
            }
            ExecutionError::LoaderExhausted { .. } => GraphqlError::new(message, ErrorCode::BatchLoadError),
            ExecutionError::OwnerAlreadySet | ExecutionError::Internal(_) => {
                GraphqlError::new(message, ErrorCode::InternalServerError)
            }
        }
    }
}

impl From<&'static str> for ExecutionError {
    fn from(message: &'static str) -> Self {
        Self::Internal(message.into())
    }
}
