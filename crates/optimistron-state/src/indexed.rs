//! Indexed state handler
//!
//! Reference [`StateHandler`] for the common case where the domain state is a
//! map from entity id to entity record. Conflict detection needs the records
//! to carry some ordering (a revision, a timestamp) exposed through the
//! caller's `compare` function.
//!
//! Merging walks both maps in full, so every sanitization pass is linear in
//! the state size times the pending list length. Very large states are a poor
//! fit for this handler.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use optimistron_core::{MergeSignal, StateHandler};

/// Entity id → entity record
pub type IndexedState<T> = BTreeMap<String, T>;

/// A record stored in an [`IndexedState`]
pub trait IndexedItem: Clone + Send + Sync {
    /// Partial update applied by `update`
    type Patch;

    /// Designated id field
    fn item_id(&self) -> &str;

    /// Shallow-merge `patch` onto this record
    fn apply_patch(&mut self, patch: Self::Patch);
}

type CompareFn<T> = dyn Fn(&T, &T) -> Ordering + Send + Sync;
type EqFn<T> = dyn Fn(&T, &T) -> bool + Send + Sync;

/// State handler over [`IndexedState`]
pub struct IndexedStateHandler<T> {
    /// `compare(incoming, existing)`: `Less` when incoming is older
    compare: Box<CompareFn<T>>,
    /// Content equality for records of the same rank
    eq: Box<EqFn<T>>,
}

impl<T: IndexedItem> IndexedStateHandler<T> {
    pub fn new(
        compare: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static,
        eq: impl Fn(&T, &T) -> bool + Send + Sync + 'static,
    ) -> Self {
        IndexedStateHandler {
            compare: Box::new(compare),
            eq: Box::new(eq),
        }
    }

    /// Handler ordering records by a key (e.g. a revision number)
    pub fn by_key<K: Ord>(
        key: impl Fn(&T) -> K + Send + Sync + 'static,
        eq: impl Fn(&T, &T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(move |a, b| key(a).cmp(&key(b)), eq)
    }
}

impl<T> fmt::Debug for IndexedStateHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedStateHandler").finish_non_exhaustive()
    }
}

impl<T: IndexedItem> StateHandler for IndexedStateHandler<T> {
    type State = IndexedState<T>;
    type Create = T;
    type Update = (String, T::Patch);
    type Remove = String;

    fn create(&self, state: &Arc<Self::State>, item: T) -> Arc<Self::State> {
        let mut next = state.as_ref().clone();
        next.insert(item.item_id().to_string(), item);
        Arc::new(next)
    }

    /// Editing a missing record is a true no-op (same `Arc`), never a create,
    /// so that stale edits are discarded by sanitization.
    fn update(&self, state: &Arc<Self::State>, (id, patch): Self::Update) -> Arc<Self::State> {
        if !state.contains_key(&id) {
            return Arc::clone(state);
        }

        let mut next = state.as_ref().clone();
        if let Some(item) = next.get_mut(&id) {
            item.apply_patch(patch);
        }
        Arc::new(next)
    }

    fn remove(&self, state: &Arc<Self::State>, id: String) -> Arc<Self::State> {
        if !state.contains_key(&id) {
            return Arc::clone(state);
        }

        let mut next = state.as_ref().clone();
        next.remove(&id);
        Arc::new(next)
    }

    fn merge(
        &self,
        existing: &Arc<Self::State>,
        incoming: &Arc<Self::State>,
    ) -> Result<Arc<Self::State>, MergeSignal> {
        let mut merged = existing.as_ref().clone();
        let mut mutated = false;

        // deletions
        for id in existing.keys() {
            if !incoming.contains_key(id) {
                merged.remove(id);
                mutated = true;
            }
        }

        // creations and updates
        for (id, incoming_item) in incoming.iter() {
            let Some(existing_item) = existing.get(id) else {
                merged.insert(id.clone(), incoming_item.clone());
                mutated = true;
                continue;
            };

            match (self.compare)(incoming_item, existing_item) {
                Ordering::Less => return Err(MergeSignal::Conflict),
                Ordering::Equal => {
                    if !(self.eq)(incoming_item, existing_item) {
                        return Err(MergeSignal::Conflict);
                    }
                }
                Ordering::Greater => {
                    merged.insert(id.clone(), incoming_item.clone());
                    mutated = true;
                }
            }
        }

        if !mutated {
            return Err(MergeSignal::Skip);
        }
        Ok(Arc::new(merged))
    }
}
