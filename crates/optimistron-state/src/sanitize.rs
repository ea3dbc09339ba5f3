//! Transition sanitization
//!
//! Replays each pending transition as if it had been committed, in list
//! order, against a working copy of the authoritative state. Transitions
//! with no effect are dropped, the state handler's `merge` decides between
//! keeping, skipping and flagging a conflict.
//!
//! Cost is one domain reduction plus one merge per pending transition, on
//! every state change. Fine for UI-sized pending lists, not for thousands.

use std::sync::Arc;

use optimistron_core::{MergeSignal, StateHandler};
use tracing::{debug, trace};

use crate::{BoundReducer, PendingList, ReconciliationState, ReducerBinding};

/// Re-validates pending transitions against an authoritative state
pub struct Sanitizer<H: StateHandler, A> {
    binding: Arc<ReducerBinding<H, A>>,
}

impl<H: StateHandler, A: Clone> Sanitizer<H, A> {
    pub fn new(binding: Arc<ReducerBinding<H, A>>) -> Self {
        Sanitizer { binding }
    }

    pub fn sanitize(&self, state: &ReconciliationState<H::State, A>) -> PendingList<A> {
        self.sanitize_pending(state.state(), state.pending())
    }

    /// Returns `pending` itself (same `Arc`) when every entry survives
    /// unchanged.
    pub fn sanitize_pending(&self, authoritative: &Arc<H::State>, pending: &PendingList<A>) -> PendingList<A> {
        let mut working = Arc::clone(authoritative);
        let mut mutated = false;
        let mut sanitized = Vec::with_capacity(pending.len());

        for entry in pending.iter() {
            let committed = entry.to_committed();
            let next = self.binding.reduce(&working, &committed);

            if Arc::ptr_eq(&next, &working) {
                trace!(id = ?entry.transition_id(), "discarding no-op transition");
                mutated = true;
                continue;
            }

            match self.binding.handler().merge(&working, &next) {
                Ok(merged) => {
                    working = merged;
                    sanitized.push(entry.clone());
                }
                Err(MergeSignal::Skip) => {
                    trace!(id = ?entry.transition_id(), "skipping transition");
                    mutated = true;
                }
                Err(MergeSignal::Conflict) => {
                    // an entry already flagged comes out identical, so it is not
                    // a change; counting it would break reference stability of a
                    // repeated pass
                    if !entry.is_conflicting() {
                        debug!(id = ?entry.transition_id(), "transition conflicts with authoritative state");
                        mutated = true;
                    }
                    sanitized.push(entry.clone().with_transition(|t| t.conflict = true));
                }
            }
        }

        if mutated {
            Arc::new(sanitized)
        } else {
            Arc::clone(pending)
        }
    }
}
