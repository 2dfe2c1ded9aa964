//! Commands sent to the sequencer.
//!
//! A [`Command`] is created by a caller for one request, consumed exactly once
//! by the sequencer and answered on its own one-shot reply channel. Each
//! operation variant carries a reply sender of the concrete type that
//! operation produces, so callers never inspect a result's type at runtime.
//!
//! Reply channels hold one value and sending never waits for the receiver.
//! A caller that gave up waiting therefore cannot stall the sequencer.

use crate::error::TodoError;
use crate::item::{Item, ItemId, ItemPatch, NewItem};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Single-use reply channel for one command
pub type Reply<T> = oneshot::Sender<T>;

/// Request-scoped trace identifier
///
/// Passed explicitly on every command and recorded in the sequencer's spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Creates a new random `TraceId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `TraceId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One operation and its reply channel
#[derive(Debug)]
pub enum Op {
    /// Return a copy of the whole list
    Get {
        /// Receives the snapshot
        reply: Reply<Vec<Item>>,
    },

    /// Append a new item under the next free ID
    Add {
        /// Validated payload
        item: NewItem,
        /// Receives the stored item
        reply: Reply<Result<Item, TodoError>>,
    },

    /// Apply a partial update
    Update {
        /// Item to update
        id: ItemId,
        /// Fields to change
        patch: ItemPatch,
        /// Receives the updated item or `NotFound`
        reply: Reply<Result<Item, TodoError>>,
    },

    /// Remove an item
    Remove {
        /// Item to remove
        id: ItemId,
        /// Receives the removed ID or `NotFound`
        reply: Reply<Result<ItemId, TodoError>>,
    },

    /// Persist the current list
    Save {
        /// Receives the persistence outcome
        reply: Reply<Result<(), TodoError>>,
    },

    /// Persist the current list and stop accepting commands
    Shutdown {
        /// Receives the final persistence outcome
        reply: Reply<Result<(), TodoError>>,
    },
}

impl Op {
    /// Returns the operation kind without its payload
    #[must_use]
    pub const fn kind(&self) -> OpKind {
        match self {
            Self::Get { .. } => OpKind::Get,
            Self::Add { .. } => OpKind::Add,
            Self::Update { .. } => OpKind::Update,
            Self::Remove { .. } => OpKind::Remove,
            Self::Save { .. } => OpKind::Save,
            Self::Shutdown { .. } => OpKind::Shutdown,
        }
    }
}

/// Operation kind, used for logging and metrics labels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// [`Op::Get`]
    Get,
    /// [`Op::Add`]
    Add,
    /// [`Op::Update`]
    Update,
    /// [`Op::Remove`]
    Remove,
    /// [`Op::Save`]
    Save,
    /// [`Op::Shutdown`]
    Shutdown,
}

impl OpKind {
    /// Lowercase name of the operation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Add => "add",
            Self::Update => "update",
            Self::Remove => "remove",
            Self::Save => "save",
            Self::Shutdown => "shutdown",
        }
    }

    /// Returns true for operations that change the list
    #[must_use]
    pub const fn is_mutation(self) -> bool {
        matches!(self, Self::Add | Self::Update | Self::Remove)
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request for the sequencer
#[derive(Debug)]
pub struct Command {
    /// Trace identifier of the originating request
    pub trace_id: TraceId,
    /// Operation with its reply channel
    pub op: Op,
}

impl Command {
    /// Builds a `Get` command and the receiver for its reply
    #[must_use]
    pub fn get(trace_id: TraceId) -> (Self, oneshot::Receiver<Vec<Item>>) {
        let (reply, receiver) = oneshot::channel();
        (Self { trace_id, op: Op::Get { reply } }, receiver)
    }

    /// Builds an `Add` command and the receiver for its reply
    #[must_use]
    pub fn add(
        trace_id: TraceId,
        item: NewItem,
    ) -> (Self, oneshot::Receiver<Result<Item, TodoError>>) {
        let (reply, receiver) = oneshot::channel();
        (
            Self {
                trace_id,
                op: Op::Add { item, reply },
            },
            receiver,
        )
    }

    /// Builds an `Update` command and the receiver for its reply
    #[must_use]
    pub fn update(
        trace_id: TraceId,
        id: ItemId,
        patch: ItemPatch,
    ) -> (Self, oneshot::Receiver<Result<Item, TodoError>>) {
        let (reply, receiver) = oneshot::channel();
        (
            Self {
                trace_id,
                op: Op::Update { id, patch, reply },
            },
            receiver,
        )
    }

    /// Builds a `Remove` command and the receiver for its reply
    #[must_use]
    pub fn remove(
        trace_id: TraceId,
        id: ItemId,
    ) -> (Self, oneshot::Receiver<Result<ItemId, TodoError>>) {
        let (reply, receiver) = oneshot::channel();
        (
            Self {
                trace_id,
                op: Op::Remove { id, reply },
            },
            receiver,
        )
    }

    /// Builds a `Save` command and the receiver for its reply
    #[must_use]
    pub fn save(trace_id: TraceId) -> (Self, oneshot::Receiver<Result<(), TodoError>>) {
        let (reply, receiver) = oneshot::channel();
        (Self { trace_id, op: Op::Save { reply } }, receiver)
    }

    /// Builds a `Shutdown` command and the receiver for its reply
    #[must_use]
    pub fn shutdown(trace_id: TraceId) -> (Self, oneshot::Receiver<Result<(), TodoError>>) {
        let (reply, receiver) = oneshot::channel();
        (
            Self {
                trace_id,
                op: Op::Shutdown { reply },
            },
            receiver,
        )
    }

    /// Returns the operation kind
    #[must_use]
    pub const fn kind(&self) -> OpKind {
        self.op.kind()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn trace_id_display() {
        let id = TraceId::new();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
        assert_ne!(TraceId::new(), id);
    }

    #[test]
    fn constructors_set_kind() {
        let trace = TraceId::new();
        assert_eq!(Command::get(trace).0.kind(), OpKind::Get);
        assert_eq!(Command::save(trace).0.kind(), OpKind::Save);
        assert_eq!(Command::shutdown(trace).0.kind(), OpKind::Shutdown);
        assert_eq!(Command::remove(trace, ItemId::new(1)).0.kind(), OpKind::Remove);
        assert_eq!(
            Command::update(trace, ItemId::new(1), ItemPatch::new()).0.kind(),
            OpKind::Update
        );
        let item = NewItem::new("x", "01-01-2025").unwrap();
        assert_eq!(Command::add(trace, item).0.kind(), OpKind::Add);
    }

    #[test]
    fn mutation_kinds() {
        assert!(OpKind::Add.is_mutation());
        assert!(OpKind::Update.is_mutation());
        assert!(OpKind::Remove.is_mutation());
        assert!(!OpKind::Get.is_mutation());
        assert!(!OpKind::Save.is_mutation());
        assert_eq!(OpKind::Shutdown.to_string(), "shutdown");
    }

    #[test]
    fn reply_send_does_not_block_without_receiver() {
        let (command, receiver) = Command::save(TraceId::new());
        drop(receiver);

        let Op::Save { reply } = command.op else {
            unreachable!("constructed as save");
        };
        assert!(reply.send(Ok(())).is_err());
    }

    #[tokio::test]
    async fn reply_reaches_waiting_receiver() {
        let (command, receiver) = Command::get(TraceId::new());
        let Op::Get { reply } = command.op else {
            unreachable!("constructed as get");
        };
        reply.send(Vec::new()).unwrap();
        assert!(receiver.await.unwrap().is_empty());
    }
}
