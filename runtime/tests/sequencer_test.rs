//! Integration tests for the sequencer
//!
//! Exercises ordering, ID allocation, persistence on save and shutdown, and
//! callers that stop waiting.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use futures::future::join_all;
use listkeeper_core::{ItemId, ItemPatch, NewItem, Persistence, TodoError};
use listkeeper_runtime::{JsonFileCodec, Sequencer, SequencerConfig, SequencerError};
use listkeeper_testing::helpers::init_tracing;
use listkeeper_testing::{FailingPersistence, MemoryPersistence, item, sample_items};
use std::collections::BTreeSet;
use std::time::Duration;
use tempfile::TempDir;

fn new_item(name: &str) -> NewItem {
    NewItem::new(name, "01-01-2025").unwrap()
}

#[tokio::test]
async fn concurrent_adds_get_unique_consecutive_ids() {
    init_tracing();
    let handle = Sequencer::start(
        MemoryPersistence::with_items(sample_items(5)),
        SequencerConfig::default(),
    )
    .await
    .unwrap();

    let adds = (0..50).map(|i| {
        let handle = handle.clone();
        tokio::spawn(async move { handle.add(new_item(&format!("task {i}"))).await })
    });
    let results = join_all(adds).await;

    let ids: BTreeSet<u64> = results
        .into_iter()
        .map(|joined| joined.unwrap().unwrap().id.get())
        .collect();
    assert_eq!(ids, (6..=55).collect::<BTreeSet<u64>>());
    assert_eq!(handle.get().await.unwrap().len(), 55);
}

#[tokio::test]
async fn gets_during_adds_see_whole_items() {
    let handle = Sequencer::start(MemoryPersistence::new(), SequencerConfig::default())
        .await
        .unwrap();

    let writer = {
        let handle = handle.clone();
        tokio::spawn(async move {
            for i in 0..100 {
                handle.add(new_item(&format!("item {i}"))).await.unwrap();
            }
        })
    };

    let mut last_len = 0;
    while !writer.is_finished() {
        let items = handle.get().await.unwrap();
        assert!(items.len() >= last_len);
        for (index, item) in items.iter().enumerate() {
            assert_eq!(item.id.get(), index as u64 + 1);
            assert_eq!(item.name, format!("item {index}"));
            assert!(!item.completed);
        }
        last_len = items.len();
    }
    writer.await.unwrap();
    assert_eq!(handle.get().await.unwrap().len(), 100);
}

#[tokio::test]
async fn completing_twice_is_idempotent() {
    let handle = Sequencer::start(
        MemoryPersistence::with_items(vec![item(1, "Walk dog", "02-01-2025")]),
        SequencerConfig::default(),
    )
    .await
    .unwrap();

    let patch = ItemPatch::new().completed(true);
    let first = handle.update(ItemId::new(1), patch.clone()).await.unwrap();
    let second = handle.update(ItemId::new(1), patch).await.unwrap();

    assert_eq!(first, second);
    assert!(second.completed);
    assert_eq!(second.name, "Walk dog");
    assert_eq!(second.due, "02-01-2025");
}

#[tokio::test]
async fn removing_unknown_id_leaves_list_unchanged() {
    let handle = Sequencer::start(
        MemoryPersistence::with_items(sample_items(3)),
        SequencerConfig::default(),
    )
    .await
    .unwrap();
    let before = handle.get().await.unwrap();

    let err = handle.remove(ItemId::new(42)).await.unwrap_err();

    assert!(matches!(
        err,
        SequencerError::Todo(TodoError::NotFound(id)) if id == ItemId::new(42)
    ));
    assert_eq!(handle.get().await.unwrap(), before);
}

#[tokio::test]
async fn buy_milk_end_to_end() {
    let handle = Sequencer::start(MemoryPersistence::new(), SequencerConfig::default())
        .await
        .unwrap();

    let item = handle
        .add(NewItem::new("Buy milk", "01-01-2025").unwrap())
        .await
        .unwrap();
    assert_eq!(item.id, ItemId::new(1));
    assert!(!item.completed);

    assert_eq!(handle.remove(item.id).await.unwrap(), ItemId::new(1));
    assert!(handle.get().await.unwrap().is_empty());
}

#[tokio::test]
async fn ids_are_not_reused_after_removing_highest() {
    let handle = Sequencer::start(MemoryPersistence::new(), SequencerConfig::default())
        .await
        .unwrap();

    handle.add(new_item("a")).await.unwrap();
    let b = handle.add(new_item("b")).await.unwrap();
    handle.remove(b.id).await.unwrap();

    let c = handle.add(new_item("c")).await.unwrap();
    assert_eq!(c.id, ItemId::new(3));
}

#[tokio::test]
async fn add_past_largest_id_fails_and_worker_survives() {
    let persistence = MemoryPersistence::with_items(vec![item(u64::MAX, "old", "01-01-2025")]);
    let handle = Sequencer::start(persistence.clone(), SequencerConfig::default())
        .await
        .unwrap();

    let err = handle.add(new_item("one too many")).await.unwrap_err();
    assert!(matches!(
        err,
        SequencerError::Todo(TodoError::IdsExhausted(id)) if id.get() == u64::MAX
    ));

    let items = handle.get().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, ItemId::new(u64::MAX));

    handle.shutdown().await.unwrap();
    assert_eq!(persistence.save_count(), 1);
}

#[tokio::test]
async fn shutdown_persists_to_file_and_restart_restores() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("todos.json");

    let handle = Sequencer::start(JsonFileCodec::new(&path), SequencerConfig::default())
        .await
        .unwrap();
    handle.add(new_item("Buy milk")).await.unwrap();
    let walk = handle.add(new_item("Walk dog")).await.unwrap();
    handle
        .update(walk.id, ItemPatch::new().completed(true))
        .await
        .unwrap();
    handle.shutdown().await.unwrap();

    let saved = JsonFileCodec::new(&path).load().await.unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved.completed_count(), 1);

    let restarted = Sequencer::start(JsonFileCodec::new(&path), SequencerConfig::default())
        .await
        .unwrap();
    let next = restarted.add(new_item("third")).await.unwrap();
    assert_eq!(next.id, ItemId::new(3));
}

#[tokio::test]
async fn mutations_without_save_are_not_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("todos.json");

    let handle = Sequencer::start(JsonFileCodec::new(&path), SequencerConfig::default())
        .await
        .unwrap();
    handle.add(new_item("ephemeral")).await.unwrap();
    assert!(!path.exists());

    handle.save().await.unwrap();
    assert_eq!(JsonFileCodec::new(&path).load().await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_shutdown_keeps_worker_alive_for_retry() {
    init_tracing();
    let persistence = FailingPersistence::save_fails();
    let handle = Sequencer::start(persistence.clone(), SequencerConfig::default())
        .await
        .unwrap();
    handle.add(new_item("precious")).await.unwrap();

    assert!(handle.shutdown().await.is_err());
    assert_eq!(handle.get().await.unwrap().len(), 1);

    persistence.set_save_fails(false);
    handle.shutdown().await.unwrap();
    handle.closed().await;
    assert_eq!(persistence.stored().len(), 1);
}

#[tokio::test]
async fn commands_after_shutdown_are_closed() {
    let handle = Sequencer::start(MemoryPersistence::new(), SequencerConfig::default())
        .await
        .unwrap();
    let other = handle.clone();

    handle.shutdown().await.unwrap();

    assert!(matches!(other.get().await, Err(SequencerError::Closed)));
    assert!(matches!(
        other.add(new_item("late")).await,
        Err(SequencerError::Closed)
    ));
    assert!(matches!(other.shutdown().await, Err(SequencerError::Closed)));
}

#[tokio::test]
async fn timed_out_callers_do_not_stall_the_worker() {
    let persistence = MemoryPersistence::new().with_save_delay(Duration::from_millis(200));
    let handle = Sequencer::start(persistence, SequencerConfig::default())
        .await
        .unwrap();

    // The slow save outlives the caller's deadline.
    let impatient = handle.clone().with_timeout(Duration::from_millis(10));
    assert!(matches!(impatient.save().await, Err(SequencerError::Timeout)));

    // The worker finishes the save and keeps serving.
    handle.add(new_item("after")).await.unwrap();
    assert_eq!(handle.get().await.unwrap().len(), 1);
}

#[tokio::test]
async fn configured_timeout_applies_to_handles() {
    let persistence = MemoryPersistence::new().with_save_delay(Duration::from_millis(200));
    let config = SequencerConfig::default().with_request_timeout(Duration::from_millis(10));
    let handle = Sequencer::start(persistence, config).await.unwrap();

    assert_eq!(handle.timeout(), Some(Duration::from_millis(10)));
    assert!(matches!(handle.save().await, Err(SequencerError::Timeout)));
}

#[tokio::test]
async fn cancelled_request_still_executes() {
    let handle = Sequencer::start(
        MemoryPersistence::new().with_save_delay(Duration::from_millis(100)),
        SequencerConfig::default(),
    )
    .await
    .unwrap();

    // Occupy the worker so the add below queues behind the save.
    let saving = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.save().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let result = listkeeper_runtime::SequencerHandle::until_cancelled(
        handle.add(new_item("queued")),
        tokio::time::sleep(Duration::from_millis(10)),
    )
    .await;
    assert!(matches!(result, Err(SequencerError::Cancelled)));

    saving.await.unwrap().unwrap();
    assert_eq!(handle.get().await.unwrap().len(), 1);
}

#[tokio::test]
async fn small_channel_applies_backpressure_without_losing_commands() {
    let config = SequencerConfig::default().with_channel_capacity(1);
    let handle = Sequencer::start(MemoryPersistence::new(), config)
        .await
        .unwrap();

    let adds = (0..20).map(|i| {
        let handle = handle.clone();
        async move { handle.add(new_item(&format!("{i}"))).await }
    });
    let results = join_all(adds).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(handle.get().await.unwrap().len(), 20);
}

#[tokio::test]
async fn malformed_data_file_fails_startup() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("todos.json");
    std::fs::write(&path, b"{ not json").unwrap();

    let err = Sequencer::start(JsonFileCodec::new(&path), SequencerConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SequencerError::Startup(TodoError::Decode { .. })
    ));
    // The unreadable file is left for inspection.
    assert_eq!(std::fs::read(&path).unwrap(), b"{ not json");
}
