//! Namespace registry
//!
//! Maps each namespace to its bound domain reducer. Written at registration
//! time, read by the optimistic selectors. Each namespace registers at most
//! once for the lifetime of the registry.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use optimistron_core::{
    BoundState, Event, Namespace, OptimistronError, OptimistronResult, ReducerError, StateHandler,
};
use parking_lot::RwLock;
use tracing::debug;

use crate::{BoundReducer, Optimistron, OptimistronOptions};

type Entry = Box<dyn Any + Send + Sync>;

/// Registry of optimistic reducers, one per namespace
#[derive(Default)]
pub struct Registry {
    reducers: RwLock<HashMap<Namespace, Entry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a namespace and build its reconciliation engine.
    ///
    /// Fails if the namespace is invalid or already registered.
    pub fn register<H, A, F>(
        &self,
        namespace: &str,
        initial: H::State,
        handler: H,
        reducer: F,
        options: OptimistronOptions<A>,
    ) -> OptimistronResult<Optimistron<H, A>>
    where
        H: StateHandler + 'static,
        A: Clone + 'static,
        F: Fn(&BoundState<'_, H>, &Event<A>) -> Result<Arc<H::State>, ReducerError>
            + Send
            + Sync
            + 'static,
    {
        let namespace = Namespace::new(namespace)?;

        let mut reducers = self.reducers.write();
        if reducers.contains_key(&namespace) {
            return Err(OptimistronError::NamespaceAlreadyRegistered(namespace.into()));
        }

        let engine = Optimistron::new(namespace.clone(), initial, handler, reducer, options);
        let bound: Arc<dyn BoundReducer<H::State, A>> = engine.binding().clone();
        reducers.insert(namespace.clone(), Box::new(bound));

        debug!(namespace = %namespace, "registered optimistic reducer");
        Ok(engine)
    }

    /// Bound reducer of a namespace, if registered with matching state and
    /// payload types
    pub fn reducer<S: 'static, A: 'static>(&self, namespace: &Namespace) -> Option<Arc<dyn BoundReducer<S, A>>> {
        self.reducers
            .read()
            .get(namespace)
            .and_then(|entry| entry.downcast_ref::<Arc<dyn BoundReducer<S, A>>>())
            .cloned()
    }

    pub fn contains(&self, namespace: &Namespace) -> bool {
        self.reducers.read().contains_key(namespace)
    }

    pub fn len(&self) -> usize {
        self.reducers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reducers.read().is_empty()
    }

    /// Registered namespaces, sorted
    pub fn namespaces(&self) -> Vec<Namespace> {
        let mut namespaces: Vec<_> = self.reducers.read().keys().cloned().collect();
        namespaces.sort();
        namespaces
    }

    /// Returns whether the namespace was registered
    pub fn unregister(&self, namespace: &Namespace) -> bool {
        self.reducers.write().remove(namespace).is_some()
    }

    /// Drop every registration (test teardown)
    pub fn clear(&self) {
        self.reducers.write().clear();
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("namespaces", &self.namespaces())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{create, item, item_handler, item_reducer, Item, ItemState};

    fn register(registry: &Registry, namespace: &str) -> OptimistronResult<()> {
        registry
            .register(
                namespace,
                ItemState::new(),
                item_handler(),
                item_reducer(),
                OptimistronOptions::default(),
            )
            .map(|_| ())
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = Registry::new();
        assert!(registry.is_empty());

        register(&registry, "todos").unwrap();

        let namespace = Namespace::new("todos").unwrap();
        assert!(registry.contains(&namespace));
        assert_eq!(registry.len(), 1);
        assert!(registry.reducer::<ItemState, Option<Item>>(&namespace).is_some());
    }

    #[test]
    fn test_register_twice_fails() {
        let registry = Registry::new();
        register(&registry, "todos").unwrap();

        assert_eq!(
            register(&registry, "todos"),
            Err(OptimistronError::NamespaceAlreadyRegistered("todos".into()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_invalid_namespace() {
        let registry = Registry::new();

        assert!(matches!(register(&registry, ""), Err(OptimistronError::InvalidNamespace(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reducer_type_mismatch() {
        let registry = Registry::new();
        register(&registry, "todos").unwrap();

        let namespace = Namespace::new("todos").unwrap();
        assert!(registry.reducer::<ItemState, u32>(&namespace).is_none());
        assert!(registry.reducer::<Vec<i32>, Option<Item>>(&namespace).is_none());
    }

    #[test]
    fn test_registered_reducer_replays_transition() {
        let registry = Registry::new();
        register(&registry, "test").unwrap();

        let reducer = registry
            .reducer::<ItemState, Option<Item>>(&Namespace::new("test").unwrap())
            .unwrap();
        let state = Arc::new(ItemState::new());
        let next = reducer.reduce(&state, &create().stage("1", Some(item("1", "a", 0))).to_committed());

        assert_eq!(next.get("1"), Some(&item("1", "a", 0)));
    }

    #[test]
    fn test_unregister_and_clear() {
        let registry = Registry::new();
        register(&registry, "a").unwrap();
        register(&registry, "b").unwrap();

        let names: Vec<String> = registry.namespaces().into_iter().map(String::from).collect();
        assert_eq!(names, vec!["a", "b"]);

        assert!(registry.unregister(&Namespace::new("a").unwrap()));
        assert!(!registry.unregister(&Namespace::new("a").unwrap()));
        register(&registry, "a").unwrap();

        registry.clear();
        assert!(registry.is_empty());
    }
}
