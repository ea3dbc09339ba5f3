//! Error types for Optimistron

use std::fmt;

use thiserror::Error;

/// Core Optimistron errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptimistronError {
    // Registration errors
    #[error("An optimistic reducer for [{0}] is already registered")]
    NamespaceAlreadyRegistered(String),

    #[error("Invalid namespace: {0:?}")]
    InvalidNamespace(String),
}

/// Result type for Optimistron operations
pub type OptimistronResult<T> = Result<T, OptimistronError>;

/// Control signals raised by `StateHandler::merge`.
///
/// Neither is a failure: `Skip` means the incoming state carries no
/// distinguishable change, `Conflict` means its premise is stale relative to
/// the existing state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeSignal {
    #[error("merge skipped: no effective change")]
    Skip,

    #[error("merge conflict: incoming state is stale")]
    Conflict,
}

/// Failure returned by a domain reducer.
///
/// Caught at the reducer binding: the event is logged and the authoritative
/// state is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReducerError {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Merge(#[from] MergeSignal),
}

impl ReducerError {
    pub fn new(message: impl fmt::Display) -> Self {
        ReducerError::Message(message.to_string())
    }
}
