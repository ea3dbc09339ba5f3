//! Reference `items` domain
//!
//! Records carry a revision; the server bumps it on every accepted write, so
//! a transition built on an older revision is stale.

use std::sync::Arc;

use optimistron_core::{BoundState, Event, OptimistronResult, ReducerError, Transitions};
use optimistron_state::{
    IndexedItem, IndexedState, IndexedStateHandler, Optimistron, OptimistronOptions,
    ReconciliationState, Registry,
};

pub const NAMESPACE: &str = "items";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub value: String,
    pub revision: i64,
}

/// Edit of an existing item
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemPatch {
    pub value: String,
    pub revision: i64,
}

impl IndexedItem for Item {
    type Patch = ItemPatch;

    fn item_id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: ItemPatch) {
        self.value = patch.value;
        self.revision = patch.revision;
    }
}

pub type ItemState = IndexedState<Item>;
pub type ItemEvent = Event<Option<Item>>;
pub type ItemHandler = IndexedStateHandler<Item>;
pub type ItemEngine = Optimistron<ItemHandler, Option<Item>>;
pub type ItemReconciliation = ReconciliationState<ItemState, Option<Item>>;

pub fn item(id: &str, value: &str, revision: i64) -> Item {
    Item {
        id: id.to_string(),
        value: value.to_string(),
        revision,
    }
}

/// Items ordered by revision, equal when id and value match
pub fn item_handler() -> ItemHandler {
    IndexedStateHandler::by_key(
        |i: &Item| i.revision,
        |a: &Item, b: &Item| a.id == b.id && a.value == b.value,
    )
}

pub fn create_item() -> Transitions {
    Transitions::new("items::add")
}

pub fn edit_item() -> Transitions {
    Transitions::new("items::edit")
}

/// Edits keep the previous entry as rollback target
pub fn edit_item_trailing() -> Transitions {
    Transitions::trailing("items::edit_with_history")
}

pub fn delete_item() -> Transitions {
    Transitions::new("items::delete")
}

/// Domain reducer. Only committed transitions touch the state.
pub fn item_reducer(
) -> impl Fn(&BoundState<'_, ItemHandler>, &ItemEvent) -> Result<Arc<ItemState>, ReducerError>
       + Send
       + Sync
       + 'static {
    let create = create_item();
    let edit = edit_item();
    let edit_trailing = edit_item_trailing();
    let delete = delete_item();

    move |state, event| {
        let Some(item) = event.payload.clone() else {
            return Ok(state.get_state());
        };

        if create.matches(event) {
            return Ok(state.create(item));
        }

        if edit.matches(event) || edit_trailing.matches(event) {
            let patch = ItemPatch {
                value: item.value,
                revision: item.revision,
            };
            return Ok(state.update((item.id, patch)));
        }

        if delete.matches(event) {
            return Ok(state.remove(item.id));
        }

        Ok(state.get_state())
    }
}

/// Register the `items` namespace
pub fn register_items(
    registry: &Registry,
    initial: ItemState,
    options: OptimistronOptions<Option<Item>>,
) -> OptimistronResult<ItemEngine> {
    registry.register(NAMESPACE, initial, item_handler(), item_reducer(), options)
}
