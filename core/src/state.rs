//! Sequencer-owned list state.
//!
//! `ListState` pairs the collection with the highest ID ever issued so that
//! IDs stay unique even after the highest item is removed.

use crate::error::TodoError;
use crate::item::{Item, ItemId, ItemPatch, NewItem};
use crate::list::TodoList;

/// A mutation of the list
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListMutation {
    /// Append a new item under the next free ID
    Add(NewItem),

    /// Apply a partial update to an item
    Update {
        /// Item to update
        id: ItemId,
        /// Fields to change
        patch: ItemPatch,
    },

    /// Remove an item
    Remove(ItemId),
}

/// The list plus its ID counter
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListState {
    list: TodoList,
    max_id_seen: ItemId,
}

impl ListState {
    /// Creates state for a loaded list, seeding the counter from its highest ID
    #[must_use]
    pub fn from_list(list: TodoList) -> Self {
        let max_id_seen = list.max_id();
        Self { list, max_id_seen }
    }

    /// Applies a mutation and returns the affected item
    ///
    /// For [`ListMutation::Remove`] the returned item is the one that was
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::NotFound`] for updates or removals of an unknown ID,
    /// and [`TodoError::IdsExhausted`] for an add once `u64::MAX` is taken. The
    /// state is unchanged in both cases.
    pub fn apply(&mut self, mutation: ListMutation) -> Result<Item, TodoError> {
        match mutation {
            ListMutation::Add(item) => {
                let id = self
                    .max_id_seen
                    .next()
                    .ok_or(TodoError::IdsExhausted(self.max_id_seen))?;
                self.max_id_seen = id;
                Ok(self.list.add(id, item))
            }
            ListMutation::Update { id, patch } => self.list.update(id, &patch),
            ListMutation::Remove(id) => self.list.remove(id),
        }
    }

    /// Returns an independent copy of every item
    #[must_use]
    pub fn snapshot(&self) -> Vec<Item> {
        self.list.list()
    }

    /// Borrows the current list
    #[must_use]
    pub const fn list(&self) -> &TodoList {
        &self.list
    }

    /// Returns the highest ID issued so far
    #[must_use]
    pub const fn max_id_seen(&self) -> ItemId {
        self.max_id_seen
    }
}
