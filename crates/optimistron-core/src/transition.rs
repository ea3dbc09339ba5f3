//! Transition metadata
//!
//! A transition (τ) is one speculative change tracked apart from the
//! authoritative state. The operation tag names the event kind that carried
//! it, not a persisted status: anything sitting in a pending list is staged.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Event, TransitionId};

/// Transition event kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Begin a speculative transition
    Stage,
    /// Revise the payload of an already staged transition
    Amend,
    /// Confirm a transition and apply it to the authoritative state
    Commit,
    /// Flag a transition as failed, keeping it for retry or dismissal
    Fail,
    /// Abandon a transition, reverting to its trailing entry if any
    Stash,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Stage,
        Operation::Amend,
        Operation::Commit,
        Operation::Fail,
        Operation::Stash,
    ];

    /// Event type suffix (`"<kind>::<suffix>"`)
    pub fn suffix(self) -> &'static str {
        match self {
            Operation::Stage => "stage",
            Operation::Amend => "amend",
            Operation::Commit => "commit",
            Operation::Fail => "fail",
            Operation::Stash => "stash",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "stage" => Some(Operation::Stage),
            "amend" => Some(Operation::Amend),
            "commit" => Some(Operation::Commit),
            "fail" => Some(Operation::Fail),
            "stash" => Some(Operation::Stash),
            _ => None,
        }
    }

    /// Does this operation write a payload into the pending list?
    #[inline]
    pub fn is_staging(self) -> bool {
        matches!(self, Operation::Stage | Operation::Amend)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Policy applied when a stage or amend hits an id that is already pending
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupeMode {
    /// Replace the pending entry, keeping no rollback target
    #[default]
    Overwrite,
    /// Replace the pending entry, keeping the previous one for stash
    Trailing,
}

/// Transition metadata carried by a transition event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition<A> {
    /// Correlates the events of one logical operation
    pub id: TransitionId,
    /// Event kind
    pub operation: Operation,
    /// Dedupe policy for repeated staging
    pub dedupe: DedupeMode,
    /// Set by the sanitizer when the transition's premise is stale
    #[serde(default)]
    pub conflict: bool,
    /// Set when the remote operation reported failure
    #[serde(default)]
    pub failed: bool,
    /// Previous staged entry superseded under `DedupeMode::Trailing`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing: Option<Box<Event<A>>>,
}

impl<A> Transition<A> {
    pub fn new(id: impl Into<TransitionId>, operation: Operation, dedupe: DedupeMode) -> Self {
        Transition {
            id: id.into(),
            operation,
            dedupe,
            conflict: false,
            failed: false,
            trailing: None,
        }
    }

    /// Does this transition belong to the given id?
    #[inline]
    pub fn is(&self, id: &TransitionId) -> bool {
        &self.id == id
    }
}
