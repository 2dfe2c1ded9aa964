//! The ordered item collection and its pure operations.
//!
//! `TodoList` never performs I/O. Every operation either succeeds or returns
//! an error with the list left exactly as it was.

use crate::error::TodoError;
use crate::item::{Item, ItemId, ItemPatch, NewItem};
use serde::{Deserialize, Serialize};

/// Ordered collection of items
///
/// Insertion order is display order. Serializes as a plain JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoList {
    items: Vec<Item>,
}

impl TodoList {
    /// Creates an empty list
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Creates a list from existing items, keeping their order
    #[must_use]
    pub const fn from_items(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Appends a new item with a pre-assigned ID and returns a copy of it
    ///
    /// The caller is responsible for `id` being unused; the sequencer
    /// guarantees this by assigning IDs from a monotonic counter.
    pub fn add(&mut self, id: ItemId, item: NewItem) -> Item {
        let item = Item::new(id, item);
        self.items.push(item.clone());
        item
    }

    /// Removes the item with `id` and returns it
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::NotFound`] if no item has that ID.
    pub fn remove(&mut self, id: ItemId) -> Result<Item, TodoError> {
        let index = self.position(id).ok_or(TodoError::NotFound(id))?;
        Ok(self.items.remove(index))
    }

    /// Applies the provided fields of `patch` to the item with `id` and returns
    /// a copy of the updated item
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::NotFound`] if no item has that ID.
    pub fn update(&mut self, id: ItemId, patch: &ItemPatch) -> Result<Item, TodoError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(TodoError::NotFound(id))?;
        patch.apply_to(item);
        Ok(item.clone())
    }

    /// Returns an independent copy of every item
    #[must_use]
    pub fn list(&self) -> Vec<Item> {
        self.items.clone()
    }

    /// Returns the item with `id`
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Borrows the items in order
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Iterates over the items in order
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Consumes the list and returns its items
    #[must_use]
    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    /// Returns the number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the list has no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of completed items
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }

    /// Returns the highest ID in the list, or `ItemId(0)` when empty
    #[must_use]
    pub fn max_id(&self) -> ItemId {
        self.items
            .iter()
            .map(|item| item.id)
            .max()
            .unwrap_or_default()
    }

    fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

impl From<Vec<Item>> for TodoList {
    fn from(items: Vec<Item>) -> Self {
        Self::from_items(items)
    }
}

impl<'a> IntoIterator for &'a TodoList {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
