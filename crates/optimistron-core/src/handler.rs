//! State handler contract
//!
//! A state handler owns the four pure operations over one domain state shape.
//! States are shared behind `Arc`; returning the *same* `Arc` (pointer-equal)
//! from `create`/`update`/`remove` is how a handler reports "no effect", and
//! the sanitizer relies on it to discard no-op transitions.

use std::sync::Arc;

use crate::MergeSignal;

/// Create/update/remove/merge over a domain state shape
pub trait StateHandler: Send + Sync {
    /// Domain state
    type State;
    /// Arguments of `create`
    type Create;
    /// Arguments of `update`
    type Update;
    /// Arguments of `remove`
    type Remove;

    fn create(&self, state: &Arc<Self::State>, args: Self::Create) -> Arc<Self::State>;

    fn update(&self, state: &Arc<Self::State>, args: Self::Update) -> Arc<Self::State>;

    fn remove(&self, state: &Arc<Self::State>, args: Self::Remove) -> Arc<Self::State>;

    /// Reconcile `incoming` against `existing`.
    ///
    /// Returns the merged state, `MergeSignal::Skip` when `incoming` changes
    /// nothing, or `MergeSignal::Conflict` when it is stale.
    fn merge(
        &self,
        existing: &Arc<Self::State>,
        incoming: &Arc<Self::State>,
    ) -> Result<Arc<Self::State>, MergeSignal>;

    /// Pre-bind the handler to `state`
    fn bind<'a>(&'a self, state: &'a Arc<Self::State>) -> BoundState<'a, Self>
    where
        Self: Sized,
    {
        BoundState::new(self, state)
    }
}

/// A state handler pre-bound to one state snapshot
pub struct BoundState<'a, H: StateHandler + ?Sized> {
    handler: &'a H,
    state: &'a Arc<H::State>,
}

impl<'a, H: StateHandler + ?Sized> BoundState<'a, H> {
    pub fn new(handler: &'a H, state: &'a Arc<H::State>) -> Self {
        BoundState { handler, state }
    }

    pub fn create(&self, args: H::Create) -> Arc<H::State> {
        self.handler.create(self.state, args)
    }

    pub fn update(&self, args: H::Update) -> Arc<H::State> {
        self.handler.update(self.state, args)
    }

    pub fn remove(&self, args: H::Remove) -> Arc<H::State> {
        self.handler.remove(self.state, args)
    }

    pub fn merge(&self, incoming: &Arc<H::State>) -> Result<Arc<H::State>, MergeSignal> {
        self.handler.merge(self.state, incoming)
    }

    /// The bound snapshot, unchanged
    pub fn get_state(&self) -> Arc<H::State> {
        Arc::clone(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sorted set of integers
    struct SetHandler;

    impl StateHandler for SetHandler {
        type State = Vec<i32>;
        type Create = i32;
        type Update = (i32, i32);
        type Remove = i32;

        fn create(&self, state: &Arc<Vec<i32>>, value: i32) -> Arc<Vec<i32>> {
            if state.contains(&value) {
                return Arc::clone(state);
            }
            let mut next = state.as_ref().clone();
            next.push(value);
            next.sort_unstable();
            Arc::new(next)
        }

        fn update(&self, state: &Arc<Vec<i32>>, (from, to): (i32, i32)) -> Arc<Vec<i32>> {
            if !state.contains(&from) {
                return Arc::clone(state);
            }
            let removed = self.remove(state, from);
            self.create(&removed, to)
        }

        fn remove(&self, state: &Arc<Vec<i32>>, value: i32) -> Arc<Vec<i32>> {
            if !state.contains(&value) {
                return Arc::clone(state);
            }
            Arc::new(state.iter().copied().filter(|v| *v != value).collect())
        }

        fn merge(
            &self,
            existing: &Arc<Vec<i32>>,
            incoming: &Arc<Vec<i32>>,
        ) -> Result<Arc<Vec<i32>>, MergeSignal> {
            if existing == incoming {
                return Err(MergeSignal::Skip);
            }
            Ok(Arc::clone(incoming))
        }
    }

    #[test]
    fn test_bound_state_forwards_to_handler() {
        let state = Arc::new(vec![1, 2]);
        let bound = SetHandler.bind(&state);

        assert_eq!(*bound.create(3), vec![1, 2, 3]);
        assert_eq!(*bound.update((1, 5)), vec![2, 5]);
        assert_eq!(*bound.remove(2), vec![1]);
        assert_eq!(bound.merge(&Arc::new(vec![9])), Ok(Arc::new(vec![9])));
        assert!(Arc::ptr_eq(&bound.get_state(), &state));
    }

    #[test]
    fn test_noop_operations_return_same_arc() {
        let state = Arc::new(vec![1]);
        let bound = SetHandler.bind(&state);

        assert!(Arc::ptr_eq(&bound.create(1), &state));
        assert!(Arc::ptr_eq(&bound.update((7, 8)), &state));
        assert!(Arc::ptr_eq(&bound.remove(4), &state));
        assert_eq!(bound.merge(&state), Err(MergeSignal::Skip));
    }
}
