//! Reducer binding
//!
//! Wraps a caller's domain reducer so it sees the state handler pre-bound to
//! the current authoritative state. A failing domain reducer never corrupts
//! state: the error is logged and the input state is returned unchanged.

use std::fmt;
use std::sync::Arc;

use optimistron_core::{BoundState, Event, ReducerError, StateHandler};
use tracing::warn;

/// Domain reducer signature
pub type DomainReducer<H, A> = dyn Fn(&BoundState<'_, H>, &Event<A>) -> Result<Arc<<H as StateHandler>::State>, ReducerError>
    + Send
    + Sync;

/// A domain reducer with its state handler already bound.
///
/// This is the shape kept in the [`Registry`](crate::Registry) and used by
/// the sanitizer and the optimistic selectors to replay transitions.
pub trait BoundReducer<S, A>: Send + Sync {
    /// Apply `event` to `state`. Returns `state` itself (same `Arc`) when the
    /// event has no effect or the domain reducer fails.
    fn reduce(&self, state: &Arc<S>, event: &Event<A>) -> Arc<S>;
}

/// Domain reducer bound to a state handler
pub struct ReducerBinding<H: StateHandler, A> {
    handler: Arc<H>,
    reducer: Box<DomainReducer<H, A>>,
}

impl<H: StateHandler, A> ReducerBinding<H, A> {
    pub fn new(
        handler: Arc<H>,
        reducer: impl Fn(&BoundState<'_, H>, &Event<A>) -> Result<Arc<H::State>, ReducerError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        ReducerBinding {
            handler,
            reducer: Box::new(reducer),
        }
    }

    #[inline]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Run the domain reducer, surfacing its error instead of swallowing it
    pub fn try_reduce(&self, state: &Arc<H::State>, event: &Event<A>) -> Result<Arc<H::State>, ReducerError> {
        (self.reducer)(&self.handler.bind(state), event)
    }
}

impl<H: StateHandler, A> BoundReducer<H::State, A> for ReducerBinding<H, A> {
    fn reduce(&self, state: &Arc<H::State>, event: &Event<A>) -> Arc<H::State> {
        match self.try_reduce(state, event) {
            Ok(next) => next,
            Err(err) => {
                warn!(event = %event.event_type(), error = %err, "Error while processing event");
                Arc::clone(state)
            }
        }
    }
}

impl<H: StateHandler, A> fmt::Debug for ReducerBinding<H, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReducerBinding").finish_non_exhaustive()
    }
}
