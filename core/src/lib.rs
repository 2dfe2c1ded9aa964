//! # Listkeeper Core
//!
//! Core types and pure operations for the listkeeper single-writer list store.
//!
//! This crate holds everything that does not perform I/O:
//!
//! - **Item**: a single todo entry plus the validated payloads that create or patch one
//! - **`TodoList`**: the ordered collection and its pure add/update/remove/list operations
//! - **`ListState`**: the collection together with the highest ID ever issued
//! - **Codec**: byte-level JSON encoding of a collection
//! - **Command**: the message a caller sends to the sequencer, with a typed reply channel
//! - **Persistence**: the trait the sequencer uses to load and save the collection
//!
//! ## Architecture Principles
//!
//! - Functional core, imperative shell: list operations never touch the disk
//! - One owner: only the sequencer (runtime crate) holds a `ListState`
//! - Typed replies: each command variant carries the reply type for its operation
//!
//! ## Example
//!
//! ```
//! use listkeeper_core::{ItemPatch, ListMutation, ListState, NewItem};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut state = ListState::default();
//!
//! let item = state.apply(ListMutation::Add(NewItem::new("Buy milk", "01-01-2025")?))?;
//! assert_eq!(item.id.get(), 1);
//!
//! let patch = ItemPatch::new().completed(true);
//! let item = state.apply(ListMutation::Update { id: item.id, patch })?;
//! assert!(item.completed);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod command;
pub mod error;
pub mod item;
pub mod list;
pub mod persistence;
pub mod state;

// Re-export commonly used types
pub use command::{Command, Op, OpKind, Reply, TraceId};
pub use error::{TodoError, ValidationError};
pub use item::{DUE_DATE_FORMAT, Item, ItemId, ItemPatch, NewItem, parse_due};
pub use list::TodoList;
pub use persistence::Persistence;
pub use state::{ListMutation, ListState};
