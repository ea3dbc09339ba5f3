//! Scenario driver
//!
//! Replays event sequences through a registered `items` engine, keeping the
//! current reconciliation state and the dispatched history around for
//! assertions.

use optimistron_core::{Event, OptimistronResult};
use optimistron_state::{
    select_is_conflicting, select_is_failed, select_is_optimistic, select_optimistic,
    OptimistronOptions, Registry,
};

use crate::{register_items, Item, ItemEngine, ItemEvent, ItemReconciliation, ItemState};

/// Event-by-event driver over the `items` namespace
pub struct Scenario {
    registry: Registry,
    engine: ItemEngine,
    state: ItemReconciliation,
    history: Vec<ItemEvent>,
}

impl Scenario {
    /// Empty `items` namespace with default options
    pub fn new() -> OptimistronResult<Self> {
        Self::with_options(ItemState::new(), OptimistronOptions::default())
    }

    pub fn with_options(
        initial: ItemState,
        options: OptimistronOptions<Option<Item>>,
    ) -> OptimistronResult<Self> {
        let registry = Registry::new();
        let engine = register_items(&registry, initial, options)?;
        let state = engine.initial_state();

        Ok(Scenario {
            registry,
            engine,
            state,
            history: Vec::new(),
        })
    }

    /// Dispatch one event. Returns whether the reconciliation state changed.
    pub fn dispatch(&mut self, event: ItemEvent) -> bool {
        let next = self.engine.reduce(Some(&self.state), &event);
        let changed = !next.same_as(&self.state);

        self.state = next;
        self.history.push(event);
        changed
    }

    /// Dispatch a sequence of events
    pub fn run(&mut self, events: impl IntoIterator<Item = ItemEvent>) -> &mut Self {
        for event in events {
            self.dispatch(event);
        }
        self
    }

    pub fn engine(&self) -> &ItemEngine {
        &self.engine
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn state(&self) -> &ItemReconciliation {
        &self.state
    }

    pub fn history(&self) -> &[ItemEvent] {
        &self.history
    }

    /// Committed items
    pub fn authoritative(&self) -> &ItemState {
        self.state.state()
    }

    /// Items with every pending transition applied
    pub fn optimistic(&self) -> ItemState {
        select_optimistic(&self.registry, &self.state, ItemState::clone)
    }

    /// Ids of pending transitions, in pending order
    pub fn pending_ids(&self) -> Vec<String> {
        self.state
            .transitions()
            .iter()
            .filter_map(Event::transition_id)
            .map(|id| id.as_str().to_string())
            .collect()
    }

    pub fn is_optimistic(&self, id: &str) -> bool {
        select_is_optimistic(&self.state, id)
    }

    pub fn is_failed(&self, id: &str) -> bool {
        select_is_failed(&self.state, id)
    }

    pub fn is_conflicting(&self, id: &str) -> bool {
        select_is_conflicting(&self.state, id)
    }
}
