//! Event envelope
//!
//! Every event has a kind and a caller-defined payload. Transition events
//! additionally carry [`Transition`] metadata; their full type renders as
//! `"<kind>::<operation>"` (e.g. `"todos::add::stage"`). Events without
//! metadata are plain domain events and bypass the pending list.

use serde::{Deserialize, Serialize};

use crate::{Namespace, Operation, Transition, TransitionId, NAMESPACE_SEPARATOR};

/// Event envelope consumed by reconciliation reducers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event<A> {
    /// Event kind without the operation suffix
    pub kind: String,
    /// Domain payload
    pub payload: A,
    /// Error description attached to failure events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Transition metadata, absent on plain domain events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition<A>>,
}

impl<A> Event<A> {
    /// Plain domain event
    pub fn new(kind: impl Into<String>, payload: A) -> Self {
        Event {
            kind: kind.into(),
            payload,
            error: None,
            transition: None,
        }
    }

    /// Transition event
    pub fn transition(kind: impl Into<String>, payload: A, transition: Transition<A>) -> Self {
        Event {
            kind: kind.into(),
            payload,
            error: None,
            transition: Some(transition),
        }
    }

    #[inline]
    pub fn is_transition(&self) -> bool {
        self.transition.is_some()
    }

    #[inline]
    pub fn transition_id(&self) -> Option<&TransitionId> {
        self.transition.as_ref().map(|t| &t.id)
    }

    #[inline]
    pub fn operation(&self) -> Option<Operation> {
        self.transition.as_ref().map(|t| t.operation)
    }

    /// Is this the transition event for `id`?
    #[inline]
    pub fn is_for(&self, id: &TransitionId) -> bool {
        self.transition_id() == Some(id)
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        self.transition.as_ref().is_some_and(|t| t.failed)
    }

    #[inline]
    pub fn is_conflicting(&self) -> bool {
        self.transition.as_ref().is_some_and(|t| t.conflict)
    }

    #[inline]
    pub fn trailing(&self) -> Option<&Event<A>> {
        self.transition.as_ref().and_then(|t| t.trailing.as_deref())
    }

    /// Full event type: `"<kind>::<operation>"` for transitions, the bare
    /// kind otherwise
    pub fn event_type(&self) -> String {
        match self.operation() {
            Some(op) => format!("{}{}{}", self.kind, NAMESPACE_SEPARATOR, op.suffix()),
            None => self.kind.clone(),
        }
    }

    /// Is this a transition event routed to `namespace`?
    pub fn is_transition_for(&self, namespace: &Namespace) -> bool {
        self.is_transition() && namespace.owns(&self.kind)
    }

    /// Same kind and same operation
    pub fn same_type(&self, other: &Event<A>) -> bool {
        self.kind == other.kind && self.operation() == other.operation()
    }

    /// Apply an in-place edit to the transition metadata. No-op on plain
    /// events.
    pub fn with_transition(mut self, update: impl FnOnce(&mut Transition<A>)) -> Self {
        if let Some(transition) = self.transition.as_mut() {
            update(transition);
        }
        self
    }
}

impl<A: Clone> Event<A> {
    /// Copy re-tagged as a staged transition
    pub fn to_staged(&self) -> Self {
        self.retagged(Operation::Stage)
    }

    /// Copy re-tagged as a committed transition
    pub fn to_committed(&self) -> Self {
        self.retagged(Operation::Commit)
    }

    fn retagged(&self, operation: Operation) -> Self {
        self.clone().with_transition(|t| t.operation = operation)
    }
}
