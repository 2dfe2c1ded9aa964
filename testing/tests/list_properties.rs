//! Property tests for list state and the JSON codec

#![allow(clippy::unwrap_used)] // Test code can use unwrap

use listkeeper_core::{ItemId, ItemPatch, ListMutation, ListState, codec};
use listkeeper_testing::properties::{item_patch, mutation, new_item, todo_list};
use proptest::prelude::*;
use std::collections::HashSet;

proptest! {
    #[test]
    fn decode_inverts_encode(list in todo_list()) {
        let bytes = codec::encode(&list).unwrap();
        prop_assert_eq!(codec::decode(&bytes).unwrap(), list);
    }

    #[test]
    fn ids_stay_unique_and_are_never_reused(
        list in todo_list(),
        mutations in proptest::collection::vec(mutation(), 0..40),
    ) {
        let mut state = ListState::from_list(list);
        let mut issued: HashSet<ItemId> = state.list().iter().map(|item| item.id).collect();

        for mutation in mutations {
            let max_before = state.max_id_seen();
            let is_add = matches!(mutation, ListMutation::Add(_));
            let result = state.apply(mutation);

            if is_add {
                let added = result.unwrap();
                prop_assert_eq!(Some(added.id), max_before.next());
                prop_assert!(issued.insert(added.id));
            }

            let ids: Vec<ItemId> = state.list().iter().map(|item| item.id).collect();
            let unique: HashSet<ItemId> = ids.iter().copied().collect();
            prop_assert_eq!(unique.len(), ids.len());
        }
    }

    #[test]
    fn failed_mutations_leave_state_unchanged(
        list in todo_list(),
        patch in item_patch(),
    ) {
        let mut state = ListState::from_list(list);
        let missing = state.max_id_seen().next().unwrap();
        let before = state.clone();

        let update_result = state.apply(ListMutation::Update { id: missing, patch });
        prop_assert!(update_result.is_err());
        prop_assert!(state.apply(ListMutation::Remove(missing)).is_err());
        prop_assert_eq!(state, before);
    }

    #[test]
    fn completing_is_idempotent_and_keeps_other_fields(item in new_item()) {
        let mut state = ListState::default();
        let added = state.apply(ListMutation::Add(item)).unwrap();
        let patch = ItemPatch::new().completed(true);

        let once = state
            .apply(ListMutation::Update { id: added.id, patch: patch.clone() })
            .unwrap();
        let twice = state
            .apply(ListMutation::Update { id: added.id, patch })
            .unwrap();

        prop_assert!(once.completed);
        prop_assert_eq!(&once.name, &added.name);
        prop_assert_eq!(&once.due, &added.due);
        prop_assert_eq!(once, twice);
    }
}
