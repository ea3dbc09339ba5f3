//! Identity types for transitions and namespaces
//!
//! Transition ids are opaque strings chosen by the caller. They correlate the
//! stage/commit/fail/stash events of one logical operation and are reused
//! across retries, so they are not unique over time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{OptimistronError, OptimistronResult};

/// Separator between a namespace and the rest of an event type
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Transition identity - correlates the events of one optimistic operation
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionId(String);

impl TransitionId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        TransitionId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transition({})", self.0)
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransitionId {
    fn from(id: &str) -> Self {
        TransitionId(id.to_string())
    }
}

impl From<String> for TransitionId {
    fn from(id: String) -> Self {
        TransitionId(id)
    }
}

impl PartialEq<str> for TransitionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TransitionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Namespace - binds a family of event kinds to one authoritative reducer
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    /// Validate and wrap a namespace key
    pub fn new(name: impl Into<String>) -> OptimistronResult<Self> {
        let name = name.into();
        if name.is_empty() || name.ends_with(NAMESPACE_SEPARATOR) {
            return Err(OptimistronError::InvalidNamespace(name));
        }
        Ok(Namespace(name))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Does an event kind live under this namespace?
    ///
    /// `"todos"` owns `"todos"`, `"todos::add"` and `"todos::add::bulk"` but
    /// not `"todos_archive::add"`.
    pub fn owns(&self, kind: &str) -> bool {
        match kind.strip_prefix(self.0.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(NAMESPACE_SEPARATOR),
            None => false,
        }
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({})", self.0)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Namespace {
    type Error = OptimistronError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Namespace::new(name)
    }
}

impl TryFrom<&str> for Namespace {
    type Error = OptimistronError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Namespace::new(name)
    }
}

impl From<Namespace> for String {
    fn from(namespace: Namespace) -> Self {
        namespace.0
    }
}
