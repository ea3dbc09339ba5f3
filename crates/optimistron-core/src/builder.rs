//! Transition event builders
//!
//! A [`Transitions`] value stands for one event kind (e.g. `"todos::edit"`)
//! and mints the stage/amend/commit/fail/stash events for it. Domain reducers
//! use [`Transitions::matches`] to recognise the committed form.

use std::fmt;

use crate::{DedupeMode, Event, Operation, Transition, TransitionId};

/// Event factory for one transition kind
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transitions {
    kind: String,
    dedupe: DedupeMode,
}

impl Transitions {
    /// Builder for `kind` with `DedupeMode::Overwrite`
    pub fn new(kind: impl Into<String>) -> Self {
        Self::with_dedupe(kind, DedupeMode::Overwrite)
    }

    /// Builder for `kind` keeping trailing entries for stash
    pub fn trailing(kind: impl Into<String>) -> Self {
        Self::with_dedupe(kind, DedupeMode::Trailing)
    }

    pub fn with_dedupe(kind: impl Into<String>, dedupe: DedupeMode) -> Self {
        Transitions {
            kind: kind.into(),
            dedupe,
        }
    }

    #[inline]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[inline]
    pub fn dedupe(&self) -> DedupeMode {
        self.dedupe
    }

    pub fn stage<A>(&self, id: impl Into<TransitionId>, payload: A) -> Event<A> {
        self.event(id, Operation::Stage, payload)
    }

    pub fn amend<A>(&self, id: impl Into<TransitionId>, payload: A) -> Event<A> {
        self.event(id, Operation::Amend, payload)
    }

    pub fn commit<A: Default>(&self, id: impl Into<TransitionId>) -> Event<A> {
        self.event(id, Operation::Commit, A::default())
    }

    /// Commit carrying a payload (e.g. the server-assigned record)
    pub fn commit_with<A>(&self, id: impl Into<TransitionId>, payload: A) -> Event<A> {
        self.event(id, Operation::Commit, payload)
    }

    pub fn stash<A: Default>(&self, id: impl Into<TransitionId>) -> Event<A> {
        self.event(id, Operation::Stash, A::default())
    }

    pub fn fail<A: Default>(&self, id: impl Into<TransitionId>, error: impl fmt::Display) -> Event<A> {
        let mut event = self.event(id, Operation::Fail, A::default());
        event.error = Some(error.to_string());
        event
    }

    /// Is `event` a committed transition of this kind?
    pub fn matches<A>(&self, event: &Event<A>) -> bool {
        event.kind == self.kind && event.operation() == Some(Operation::Commit)
    }

    fn event<A>(&self, id: impl Into<TransitionId>, operation: Operation, payload: A) -> Event<A> {
        Event::transition(
            self.kind.clone(),
            payload,
            Transition::new(id, operation, self.dedupe),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_stamps_metadata() {
        let edit = Transitions::trailing("todos::edit");
        let stage = edit.stage("t1", 3u32);
        let meta = stage.transition.as_ref().unwrap();

        assert_eq!(stage.kind, "todos::edit");
        assert_eq!(meta.id, "t1");
        assert_eq!(meta.operation, Operation::Stage);
        assert_eq!(meta.dedupe, DedupeMode::Trailing);
        assert!(!meta.failed && !meta.conflict);
    }

    #[test]
    fn test_fail_carries_error() {
        let add = Transitions::new("todos::add");
        let fail: Event<u32> = add.fail("t1", "timeout");

        assert_eq!(fail.operation(), Some(Operation::Fail));
        assert_eq!(fail.error.as_deref(), Some("timeout"));
        assert_eq!(fail.payload, 0);
    }

    #[test]
    fn test_matches_only_commits_of_same_kind() {
        let add = Transitions::new("todos::add");
        let edit = Transitions::new("todos::edit");

        assert!(add.matches(&add.commit::<u32>("t1")));
        assert!(add.matches(&add.stage("t1", 1u32).to_committed()));
        assert!(!add.matches(&add.stage("t1", 1u32)));
        assert!(!add.matches(&edit.commit::<u32>("t1")));
        assert!(!add.matches(&Event::new("todos::add", 1u32)));
    }
}
