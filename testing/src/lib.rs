//! # Listkeeper Testing
//!
//! Testing utilities and helpers for listkeeper.
//!
//! This crate provides:
//! - In-memory and failing [`Persistence`](listkeeper_core::Persistence) backends
//! - Fixtures for items and trace IDs
//! - A Given-When-Then harness for list mutations
//! - proptest strategies for list types
//!
//! ## Example
//!
//! ```
//! use listkeeper_core::{ItemId, ItemPatch, ListMutation};
//! use listkeeper_testing::{ListTest, sample_items};
//!
//! ListTest::new()
//!     .given_items(sample_items(2))
//!     .when(ListMutation::Update {
//!         id: ItemId::new(2),
//!         patch: ItemPatch::new().completed(true),
//!     })
//!     .then_result(|result| assert!(result.as_ref().is_ok_and(|item| item.completed)))
//!     .then_list(|list| assert_eq!(list.completed_count(), 1))
//!     .run();
//! ```

pub mod mocks;

/// Fixtures for items and trace IDs
pub mod fixtures {
    use listkeeper_core::{Item, ItemId, TraceId};
    use uuid::Uuid;

    /// Builds an item directly, bypassing validation
    #[must_use]
    pub fn item(id: u64, name: &str, due: &str) -> Item {
        Item {
            id: ItemId::new(id),
            name: name.to_string(),
            completed: false,
            due: due.to_string(),
        }
    }

    /// `n` incomplete items with IDs `1..=n`
    ///
    /// Due dates cycle through the first 28 days of January 2025.
    #[must_use]
    pub fn sample_items(n: u64) -> Vec<Item> {
        (1..=n)
            .map(|id| item(id, &format!("Task {id}"), &format!("{:02}-01-2025", (id - 1) % 28 + 1)))
            .collect()
    }

    /// A fixed trace ID, for asserting on propagated IDs
    #[must_use]
    pub const fn test_trace_id() -> TraceId {
        TraceId::from_uuid(Uuid::from_u128(0x6f1c_2b9e_0d4a_4c3f_9a57_1e2d_3c4b_5a69))
    }
}

/// Test helpers and utilities
pub mod helpers {
    /// Installs a fmt subscriber for test output
    ///
    /// Respects `RUST_LOG`; safe to call from every test.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "listkeeper=debug".into()),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    #![allow(clippy::unwrap_used)] // Strategies only produce valid input

    use listkeeper_core::{Item, ItemId, ItemPatch, ListMutation, NewItem, TodoList};
    use proptest::prelude::*;

    /// Due dates in `DD-MM-YYYY` form that always parse
    pub fn valid_due() -> impl Strategy<Value = String> {
        (1u32..=28, 1u32..=12, 1970u32..=2099)
            .prop_map(|(day, month, year)| format!("{day:02}-{month:02}-{year:04}"))
    }

    /// Non-blank item names
    pub fn item_name() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 ]{0,24}"
    }

    /// Validated payloads for new items
    pub fn new_item() -> impl Strategy<Value = NewItem> {
        (item_name(), valid_due()).prop_map(|(name, due)| NewItem::new(name, due).unwrap())
    }

    /// Valid patches, including the empty patch
    pub fn item_patch() -> impl Strategy<Value = ItemPatch> {
        (
            proptest::option::of(item_name()),
            proptest::option::of(valid_due()),
            proptest::option::of(any::<bool>()),
        )
            .prop_map(|(name, due, completed)| ItemPatch {
                name,
                due,
                completed,
            })
    }

    /// Lists with unique, ascending, possibly sparse IDs
    pub fn todo_list() -> impl Strategy<Value = TodoList> {
        proptest::collection::vec((item_name(), valid_due(), any::<bool>(), 1u64..4), 0..16)
            .prop_map(|rows| {
                let mut id = 0;
                let items = rows
                    .into_iter()
                    .map(|(name, due, completed, gap)| {
                        id += gap;
                        Item {
                            id: ItemId::new(id),
                            name,
                            completed,
                            due,
                        }
                    })
                    .collect();
                TodoList::from_items(items)
            })
    }

    /// Mutations whose IDs may or may not exist
    pub fn mutation() -> impl Strategy<Value = ListMutation> {
        prop_oneof![
            new_item().prop_map(ListMutation::Add),
            (1u64..24, item_patch()).prop_map(|(id, patch)| ListMutation::Update {
                id: ItemId::new(id),
                patch,
            }),
            (1u64..24).prop_map(|id| ListMutation::Remove(ItemId::new(id))),
        ]
    }
}

// Re-export commonly used items
pub use fixtures::{item, sample_items, test_trace_id};
pub use list_test::ListTest;
pub use mocks::{FailingPersistence, MemoryPersistence};

#[cfg(test)]
mod tests {
    use super::*;
    use listkeeper_core::parse_due;

    #[test]
    fn sample_items_are_valid_and_sequential() {
        let items = sample_items(30);
        assert_eq!(items.len(), 30);
        for (index, item) in items.iter().enumerate() {
            assert_eq!(item.id.get(), index as u64 + 1);
            assert!(parse_due(&item.due).is_ok());
            assert!(!item.completed);
        }
    }

    #[test]
    fn test_trace_id_is_stable() {
        assert_eq!(test_trace_id(), test_trace_id());
    }
}
