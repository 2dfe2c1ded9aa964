//! Mock persistence backends
//!
//! Both mocks are cheap to clone and clones share state, so a test can keep
//! one copy to inspect after handing the other to a sequencer.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Only panics on a poisoned lock

use async_trait::async_trait;
use listkeeper_core::{Item, Persistence, TodoError, TodoList};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory persistence
///
/// `load` returns the stored list and `save` replaces it. Saves are counted,
/// and can be slowed down to simulate a busy disk.
///
/// # Example
///
/// ```
/// use listkeeper_testing::{MemoryPersistence, sample_items};
///
/// let persistence = MemoryPersistence::with_items(sample_items(2));
/// assert_eq!(persistence.stored().len(), 2);
/// assert_eq!(persistence.save_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    stored: Arc<Mutex<TodoList>>,
    saves: Arc<AtomicUsize>,
    save_delay: Option<Duration>,
}

impl MemoryPersistence {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that loads `list`
    #[must_use]
    pub fn with_list(list: TodoList) -> Self {
        Self {
            stored: Arc::new(Mutex::new(list)),
            ..Self::default()
        }
    }

    /// Create a store that loads `items`
    #[must_use]
    pub fn with_items(items: Vec<Item>) -> Self {
        Self::with_list(TodoList::from_items(items))
    }

    /// Make every save sleep for `delay` before storing
    #[must_use]
    pub const fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = Some(delay);
        self
    }

    /// The most recently saved (or initial) list
    #[must_use]
    pub fn stored(&self) -> TodoList {
        self.stored.lock().unwrap().clone()
    }

    /// Number of completed saves
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Number of live clones, this one included
    ///
    /// Drops back to 1 once a sequencer that was given a clone has exited.
    #[must_use]
    pub fn clone_count(&self) -> usize {
        Arc::strong_count(&self.stored)
    }
}

#[async_trait]
impl Persistence for MemoryPersistence {
    async fn load(&self) -> Result<TodoList, TodoError> {
        Ok(self.stored())
    }

    async fn save(&self, list: &TodoList) -> Result<(), TodoError> {
        if let Some(delay) = self.save_delay {
            tokio::time::sleep(delay).await;
        }
        *self.stored.lock().unwrap() = list.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

/// Persistence whose load and save can be made to fail
///
/// Successful saves go to an inner [`MemoryPersistence`]. Failures are
/// reported as [`TodoError::Io`].
#[derive(Debug, Clone, Default)]
pub struct FailingPersistence {
    inner: MemoryPersistence,
    load_fails: Arc<AtomicBool>,
    save_fails: Arc<AtomicBool>,
}

impl FailingPersistence {
    /// Create a backend where nothing fails yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend whose load fails
    #[must_use]
    pub fn load_fails() -> Self {
        let persistence = Self::new();
        persistence.set_load_fails(true);
        persistence
    }

    /// Create a backend whose saves fail
    #[must_use]
    pub fn save_fails() -> Self {
        let persistence = Self::new();
        persistence.set_save_fails(true);
        persistence
    }

    /// Toggle load failures
    pub fn set_load_fails(&self, fails: bool) {
        self.load_fails.store(fails, Ordering::SeqCst);
    }

    /// Toggle save failures
    pub fn set_save_fails(&self, fails: bool) {
        self.save_fails.store(fails, Ordering::SeqCst);
    }

    /// The last successfully saved list
    #[must_use]
    pub fn stored(&self) -> TodoList {
        self.inner.stored()
    }

    fn failure(&self, what: &str) -> TodoError {
        TodoError::io(
            self.location(),
            std::io::Error::other(format!("simulated {what} failure")),
        )
    }
}

#[async_trait]
impl Persistence for FailingPersistence {
    async fn load(&self) -> Result<TodoList, TodoError> {
        if self.load_fails.load(Ordering::SeqCst) {
            return Err(self.failure("load"));
        }
        self.inner.load().await
    }

    async fn save(&self, list: &TodoList) -> Result<(), TodoError> {
        if self.save_fails.load(Ordering::SeqCst) {
            return Err(self.failure("save"));
        }
        self.inner.save(list).await
    }

    fn location(&self) -> String {
        "failing-memory".to_string()
    }
}
