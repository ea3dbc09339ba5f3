//! Transition reconciliation engine
//!
//! Owns one namespace's [`ReconciliationState`]: the authoritative domain
//! state plus the pending transition list, kept side by side and never mixed
//! into the domain state itself.
//!
//! Per event:
//! 1. Plain events (or transitions of another namespace) go straight to the
//!    domain reducer; the pending list is untouched.
//! 2. Transition events of this namespace update the pending list. A commit
//!    additionally applies the matching staged entry, re-tagged as committed,
//!    to the authoritative state. Nothing else mutates it.
//! 3. If anything changed, the pending list is sanitized against the new
//!    authoritative state.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use optimistron_core::{BoundState, Event, Namespace, Operation, ReducerError, StateHandler};
use tracing::warn;

use crate::{
    process_transition, BoundReducer, OptimistronOptions, PendingList, ReducerBinding, Sanitizer,
};

/// Authoritative state and pending transitions of one namespace
pub struct ReconciliationState<S, A> {
    state: Arc<S>,
    transitions: PendingList<A>,
    namespace: Namespace,
}

impl<S, A> ReconciliationState<S, A> {
    /// Fresh state with an empty pending list
    pub fn new(namespace: Namespace, state: S) -> Self {
        Self::from_parts(namespace, state, Vec::new())
    }

    /// Rebuild a state from its parts (e.g. when hydrating a persisted store)
    pub fn from_parts(namespace: Namespace, state: S, transitions: Vec<Event<A>>) -> Self {
        ReconciliationState {
            state: Arc::new(state),
            transitions: Arc::new(transitions),
            namespace,
        }
    }

    /// Authoritative (committed) domain state
    #[inline]
    pub fn state(&self) -> &Arc<S> {
        &self.state
    }

    #[inline]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Pending transitions, in staging order.
    ///
    /// Exposed for the test harness and persistence. Consumers read pending
    /// transitions through the selectors.
    #[doc(hidden)]
    #[inline]
    pub fn transitions(&self) -> &[Event<A>] {
        &self.transitions
    }

    /// Shared pending list, for reference comparisons in the harness
    #[doc(hidden)]
    #[inline]
    pub fn pending(&self) -> &PendingList<A> {
        &self.transitions
    }

    /// Reference identity: same authoritative state and same pending list
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state) && Arc::ptr_eq(&self.transitions, &other.transitions)
    }

    /// Successor state, or `self` again when nothing changed
    fn next(&self, state: Arc<S>, transitions: PendingList<A>) -> Self {
        ReconciliationState {
            state,
            transitions,
            namespace: self.namespace.clone(),
        }
    }
}

impl<S, A> Clone for ReconciliationState<S, A> {
    fn clone(&self) -> Self {
        ReconciliationState {
            state: Arc::clone(&self.state),
            transitions: Arc::clone(&self.transitions),
            namespace: self.namespace.clone(),
        }
    }
}

impl<S: fmt::Debug, A: fmt::Debug> fmt::Debug for ReconciliationState<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconciliationState")
            .field("namespace", &self.namespace)
            .field("state", &self.state)
            .field("transitions", &self.transitions)
            .finish()
    }
}

/// Reconciliation engine for one namespace.
///
/// Obtained from [`Registry::register`](crate::Registry::register).
pub struct Optimistron<H: StateHandler, A> {
    namespace: Namespace,
    initial: Arc<H::State>,
    binding: Arc<ReducerBinding<H, A>>,
    sanitizer: Sanitizer<H, A>,
    options: OptimistronOptions<A>,
    over_threshold: AtomicBool,
}

impl<H: StateHandler, A: Clone> Optimistron<H, A> {
    pub(crate) fn new(
        namespace: Namespace,
        initial: H::State,
        handler: H,
        reducer: impl Fn(&BoundState<'_, H>, &Event<A>) -> Result<Arc<H::State>, ReducerError>
            + Send
            + Sync
            + 'static,
        options: OptimistronOptions<A>,
    ) -> Self {
        let binding = Arc::new(ReducerBinding::new(Arc::new(handler), reducer));

        Optimistron {
            namespace,
            initial: Arc::new(initial),
            sanitizer: Sanitizer::new(Arc::clone(&binding)),
            binding,
            options,
            over_threshold: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    #[inline]
    pub fn options(&self) -> &OptimistronOptions<A> {
        &self.options
    }

    /// The bound domain reducer shared with the registry
    pub fn binding(&self) -> &Arc<ReducerBinding<H, A>> {
        &self.binding
    }

    pub fn initial_state(&self) -> ReconciliationState<H::State, A> {
        ReconciliationState {
            state: Arc::clone(&self.initial),
            transitions: Arc::new(Vec::new()),
            namespace: self.namespace.clone(),
        }
    }

    /// Fold one event into the reconciliation state.
    ///
    /// `None` starts from the initial state. When the event changes nothing
    /// the returned state is [`same_as`](ReconciliationState::same_as) the
    /// input.
    pub fn reduce(
        &self,
        current: Option<&ReconciliationState<H::State, A>>,
        event: &Event<A>,
    ) -> ReconciliationState<H::State, A> {
        let current = match current {
            Some(current) => current.clone(),
            None => self.initial_state(),
        };

        let next = self.apply(&current, event);
        if next.same_as(&current) {
            return next;
        }

        let next = if self.options.config.sanitize {
            let transitions = self.sanitizer.sanitize(&next);
            ReconciliationState { transitions, ..next }
        } else {
            next
        };

        self.check_pending(next.transitions().len());
        next
    }

    fn apply(
        &self,
        current: &ReconciliationState<H::State, A>,
        event: &Event<A>,
    ) -> ReconciliationState<H::State, A> {
        let Some(meta) = event.transition.as_ref().filter(|_| event.is_transition_for(&self.namespace)) else {
            let state = self.binding.reduce(current.state(), event);
            return current.next(state, Arc::clone(current.pending()));
        };

        let transitions = match &self.options.sanitize_action {
            Some(hook) => process_transition(&hook(event.clone()), current.pending()),
            None => process_transition(event, current.pending()),
        };

        if meta.operation != Operation::Commit {
            // speculative: readers get it through the optimistic selectors
            return current.next(Arc::clone(current.state()), transitions);
        }

        match current.transitions().iter().find(|entry| entry.is_for(&meta.id)) {
            Some(staged) => {
                let state = self.binding.reduce(current.state(), &staged.to_committed());
                current.next(state, transitions)
            }
            None => current.next(Arc::clone(current.state()), transitions),
        }
    }

    fn check_pending(&self, len: usize) {
        let threshold = self.options.config.pending_warn_threshold;
        if threshold == 0 {
            return;
        }

        let over = len > threshold;
        if over && !self.over_threshold.swap(true, Ordering::Relaxed) {
            warn!(
                namespace = %self.namespace,
                pending = len,
                threshold,
                "pending transition list is large; sanitization cost grows with it"
            );
        } else if !over {
            self.over_threshold.store(false, Ordering::Relaxed);
        }
    }
}

impl<H: StateHandler, A> fmt::Debug for Optimistron<H, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Optimistron")
            .field("namespace", &self.namespace)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
