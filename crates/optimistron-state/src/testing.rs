//! Shared fixtures for unit tests

use std::sync::Arc;

use optimistron_core::{BoundState, Event, ReducerError, Transitions};

use crate::{IndexedItem, IndexedState, IndexedStateHandler};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub value: String,
    pub revision: i64,
}

impl IndexedItem for Item {
    type Patch = Item;

    fn item_id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: Item) {
        *self = patch;
    }
}

pub type ItemState = IndexedState<Item>;
pub type ItemEvent = Event<Option<Item>>;

pub fn item(id: &str, value: &str, revision: i64) -> Item {
    Item {
        id: id.to_string(),
        value: value.to_string(),
        revision,
    }
}

pub fn item_handler() -> IndexedStateHandler<Item> {
    IndexedStateHandler::by_key(
        |i: &Item| i.revision,
        |a: &Item, b: &Item| a.id == b.id && a.value == b.value,
    )
}

pub fn create() -> Transitions {
    Transitions::new("test::add")
}

pub fn edit() -> Transitions {
    Transitions::new("test::edit")
}

pub const THROW: &str = "throw";

pub fn item_reducer(
) -> impl Fn(&BoundState<'_, IndexedStateHandler<Item>>, &ItemEvent) -> Result<Arc<ItemState>, ReducerError>
       + Send
       + Sync
       + 'static {
    let create = create();
    let edit = edit();

    move |bound, event| {
        if event.kind == THROW {
            return Err(ReducerError::new("test error"));
        }

        match &event.payload {
            Some(item) if create.matches(event) => Ok(bound.create(item.clone())),
            Some(item) if edit.matches(event) => Ok(bound.update((item.id.clone(), item.clone()))),
            _ => Ok(bound.get_state()),
        }
    }
}
