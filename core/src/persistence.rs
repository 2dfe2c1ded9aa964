//! Persistence backend abstraction.
//!
//! The sequencer loads the list once at startup and saves it on demand. It
//! reaches storage only through this trait, so production code uses the JSON
//! file codec from the runtime crate while tests inject in-memory or failing
//! backends.
//!
//! # Examples
//!
//! ```ignore
//! // Production - a JSON file on disk
//! let persistence = JsonFileCodec::new("todos.json");
//!
//! // Test - an in-memory snapshot
//! let persistence = MemoryPersistence::new();
//! ```

use crate::error::TodoError;
use crate::list::TodoList;
use async_trait::async_trait;
use std::sync::Arc;

/// Storage for the single list
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Loads the stored list
    ///
    /// A backend with nothing stored yet returns an empty list, not an error.
    ///
    /// # Errors
    ///
    /// - [`TodoError::Io`] if storage cannot be read
    /// - [`TodoError::Decode`] if stored content is not a list of items
    async fn load(&self) -> Result<TodoList, TodoError>;

    /// Replaces the stored list with `list`
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Io`] or [`TodoError::Encode`]. On failure the
    /// previously stored list is left in place.
    async fn save(&self, list: &TodoList) -> Result<(), TodoError>;

    /// Human-readable storage location, used in logs and errors
    fn location(&self) -> String;
}

#[async_trait]
impl<P> Persistence for Arc<P>
where
    P: Persistence + ?Sized,
{
    async fn load(&self) -> Result<TodoList, TodoError> {
        (**self).load().await
    }

    async fn save(&self, list: &TodoList) -> Result<(), TodoError> {
        (**self).save(list).await
    }

    fn location(&self) -> String {
        (**self).location()
    }
}
