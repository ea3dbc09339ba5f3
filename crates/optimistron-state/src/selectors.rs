//! Read-only selectors over a [`ReconciliationState`]
//!
//! The pending list is internal; callers inspect it through these.

use std::sync::Arc;

use optimistron_core::Event;

use crate::{ReconciliationState, Registry};

/// Project the optimistic view: every pending transition replayed as
/// committed, in order, against the authoritative state.
///
/// Without a registered reducer for the state's namespace the projection
/// sees the authoritative state.
pub fn select_optimistic<S, A, T>(
    registry: &Registry,
    state: &ReconciliationState<S, A>,
    projection: impl FnOnce(&S) -> T,
) -> T
where
    S: 'static,
    A: Clone + 'static,
{
    let Some(reducer) = registry.reducer::<S, A>(state.namespace()) else {
        return projection(state.state());
    };

    let optimistic = state
        .transitions()
        .iter()
        .fold(Arc::clone(state.state()), |acc, entry| {
            reducer.reduce(&acc, &entry.to_committed())
        });

    projection(&optimistic)
}

fn find<'a, S, A>(
    state: &'a ReconciliationState<S, A>,
    id: &str,
    pred: impl Fn(&Event<A>) -> bool,
) -> Option<&'a Event<A>> {
    state
        .transitions()
        .iter()
        .find(|entry| entry.transition_id().is_some_and(|t| t == id) && pred(*entry))
}

/// Is there a pending transition for `id`?
pub fn select_is_optimistic<S, A>(state: &ReconciliationState<S, A>, id: &str) -> bool {
    find(state, id, |_| true).is_some()
}

pub fn select_is_failed<S, A>(state: &ReconciliationState<S, A>, id: &str) -> bool {
    find(state, id, Event::is_failed).is_some()
}

pub fn select_is_conflicting<S, A>(state: &ReconciliationState<S, A>, id: &str) -> bool {
    select_conflicting_transition(state, id).is_some()
}

/// The failed pending transition for `id`, re-tagged as a fresh stage with
/// the failure flag cleared. Dispatching it retries the transition.
pub fn select_failed_transition<S, A: Clone>(state: &ReconciliationState<S, A>, id: &str) -> Option<Event<A>> {
    find(state, id, Event::is_failed).map(|entry| entry.to_staged().with_transition(|t| t.failed = false))
}

pub fn select_conflicting_transition<'a, S, A>(
    state: &'a ReconciliationState<S, A>,
    id: &str,
) -> Option<&'a Event<A>> {
    find(state, id, Event::is_conflicting)
}

/// All failed pending transitions, in pending order
pub fn select_failed_transitions<S, A>(state: &ReconciliationState<S, A>) -> Vec<&Event<A>> {
    state.transitions().iter().filter(|entry| entry.is_failed()).collect()
}
