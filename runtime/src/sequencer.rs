//! The sequencer: one task that owns the list.
//!
//! All reads and writes of the list happen on the sequencer task, one command
//! at a time, in the order commands arrive on the channel. Callers talk to it
//! through a [`SequencerHandle`], which submits a [`Command`] and waits on that
//! command's own reply channel.
//!
//! # Lifecycle
//!
//! 1. **Initializing**: [`Sequencer::start`] loads the list. No handle exists
//!    yet, so nothing can be submitted. A load failure is returned as
//!    [`SequencerError::Startup`].
//! 2. **Running**: the task drains the channel. `Save` and `Shutdown` are the
//!    only operations that persist.
//! 3. **Stopped**: after a successful `Shutdown` the channel is closed and any
//!    queued commands are dropped unanswered, so their callers observe
//!    [`SequencerError::Closed`]. If every handle is dropped instead, the task
//!    exits without persisting.

use crate::config::SequencerConfig;
use crate::error::SequencerError;
use crate::metrics::SequencerMetrics;
use listkeeper_core::{
    Command, Item, ItemId, ItemPatch, ListMutation, ListState, NewItem, Op, Persistence, Reply,
    TodoError, TraceId,
};
use std::future::Future;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing::Instrument;

/// Owner of the list and the receiving end of the command channel
///
/// Never held by callers; [`start`](Self::start) moves it onto its own task.
pub struct Sequencer<P> {
    state: ListState,
    persistence: P,
    receiver: mpsc::Receiver<Command>,
}

impl<P: Persistence + 'static> Sequencer<P> {
    /// Loads the list and spawns the sequencer task
    ///
    /// # Errors
    ///
    /// - [`SequencerError::Config`] if `config` fails validation
    /// - [`SequencerError::Startup`] if the list cannot be loaded
    pub async fn start(
        persistence: P,
        config: SequencerConfig,
    ) -> Result<SequencerHandle, SequencerError> {
        config.validate()?;

        let list = persistence.load().await.map_err(|err| {
            tracing::error!(location = %persistence.location(), error = %err, "Failed to load list");
            SequencerError::Startup(err)
        })?;

        let state = ListState::from_list(list);
        SequencerMetrics::record_items(state.list().len());

        let (sender, receiver) = mpsc::channel(config.channel_capacity);
        let span = tracing::info_span!("sequencer", location = %persistence.location());
        let sequencer = Self {
            state,
            persistence,
            receiver,
        };
        tokio::spawn(sequencer.run().instrument(span));

        Ok(SequencerHandle {
            sender,
            timeout: config.request_timeout,
            trace_id: None,
        })
    }

    async fn run(mut self) {
        tracing::info!(
            items = self.state.list().len(),
            max_id = %self.state.max_id_seen(),
            "Sequencer running"
        );

        while let Some(command) = self.receiver.recv().await {
            if self.handle(command).await.is_break() {
                self.stop();
                return;
            }
        }

        tracing::info!("All handles dropped, sequencer exiting without saving");
    }

    /// Closes the channel and drops whatever is still queued.
    fn stop(&mut self) {
        self.receiver.close();

        let mut dropped = 0_usize;
        while let Ok(command) = self.receiver.try_recv() {
            tracing::debug!(trace_id = %command.trace_id, op = %command.kind(), "Dropping queued command");
            dropped += 1;
        }
        if dropped > 0 {
            tracing::warn!(dropped, "Dropped commands queued behind shutdown");
        }

        tracing::info!("Sequencer stopped");
    }

    async fn handle(&mut self, command: Command) -> ControlFlow<()> {
        let Command { trace_id, op } = command;
        let kind = op.kind();
        let span = tracing::debug_span!("command", %trace_id, op = %kind);

        let started = Instant::now();
        let (succeeded, flow) = self.execute(op).instrument(span).await;
        SequencerMetrics::record_command(kind, started.elapsed());

        if !succeeded {
            SequencerMetrics::record_error(kind);
        }
        if kind.is_mutation() {
            SequencerMetrics::record_items(self.state.list().len());
        }
        flow
    }

    /// Runs one operation and replies. Returns whether it succeeded.
    async fn execute(&mut self, op: Op) -> (bool, ControlFlow<()>) {
        match op {
            Op::Get { reply } => {
                deliver(reply, self.state.snapshot());
                (true, ControlFlow::Continue(()))
            }
            Op::Add { item, reply } => {
                let result = self.state.apply(ListMutation::Add(item));
                if let Ok(item) = &result {
                    tracing::debug!(id = %item.id, "Item added");
                }
                (reply_with(reply, result), ControlFlow::Continue(()))
            }
            Op::Update { id, patch, reply } => {
                let result = self.state.apply(ListMutation::Update { id, patch });
                (reply_with(reply, result), ControlFlow::Continue(()))
            }
            Op::Remove { id, reply } => {
                let result = self
                    .state
                    .apply(ListMutation::Remove(id))
                    .map(|removed| removed.id);
                (reply_with(reply, result), ControlFlow::Continue(()))
            }
            Op::Save { reply } => {
                let result = self.persistence.save(self.state.list()).await;
                (reply_with(reply, result), ControlFlow::Continue(()))
            }
            Op::Shutdown { reply } => match self.persistence.save(self.state.list()).await {
                Ok(()) => {
                    tracing::info!(items = self.state.list().len(), "Final save complete");
                    deliver(reply, Ok(()));
                    (true, ControlFlow::Break(()))
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Final save failed, sequencer keeps running");
                    deliver(reply, Err(err));
                    (false, ControlFlow::Continue(()))
                }
            },
        }
    }
}

fn reply_with<T>(reply: Reply<Result<T, TodoError>>, result: Result<T, TodoError>) -> bool {
    if let Err(err) = &result {
        tracing::debug!(error = %err, "Command failed");
    }
    let succeeded = result.is_ok();
    deliver(reply, result);
    succeeded
}

fn deliver<T>(reply: Reply<T>, value: T) {
    if reply.send(value).is_err() {
        tracing::debug!("Caller stopped waiting, reply discarded");
    }
}

/// Cloneable client for a running sequencer
///
/// Each call builds one command, submits it (waiting for channel space when
/// the queue is full) and awaits its reply. A handle-wide deadline can be set
/// with [`with_timeout`](Self::with_timeout); giving up never retracts a
/// command that was already queued.
#[derive(Clone, Debug)]
pub struct SequencerHandle {
    sender: mpsc::Sender<Command>,
    timeout: Option<Duration>,
    trace_id: Option<TraceId>,
}

impl SequencerHandle {
    /// Returns a handle that gives up waiting after `timeout`
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns a handle that waits indefinitely
    #[must_use]
    pub const fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Returns a handle that tags every command with `trace_id`
    ///
    /// Without one, each command gets a fresh trace ID.
    #[must_use]
    pub const fn with_trace(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// The deadline applied to each request, if any
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns a copy of every item in the list
    ///
    /// # Errors
    ///
    /// [`SequencerError::Closed`] or [`SequencerError::Timeout`].
    pub async fn get(&self) -> Result<Vec<Item>, SequencerError> {
        let (command, reply) = Command::get(self.next_trace_id());
        self.submit(command, reply).await
    }

    /// Appends an item under the next free ID and returns it
    ///
    /// # Errors
    ///
    /// [`SequencerError::Closed`] or [`SequencerError::Timeout`].
    pub async fn add(&self, item: NewItem) -> Result<Item, SequencerError> {
        let (command, reply) = Command::add(self.next_trace_id(), item);
        Ok(self.submit(command, reply).await??)
    }

    /// Applies `patch` to item `id` and returns the updated item
    ///
    /// # Errors
    ///
    /// `NotFound` (as [`SequencerError::Todo`]) for an unknown ID, otherwise
    /// [`SequencerError::Closed`] or [`SequencerError::Timeout`].
    pub async fn update(&self, id: ItemId, patch: ItemPatch) -> Result<Item, SequencerError> {
        let (command, reply) = Command::update(self.next_trace_id(), id, patch);
        Ok(self.submit(command, reply).await??)
    }

    /// Removes item `id` and returns its ID
    ///
    /// # Errors
    ///
    /// `NotFound` (as [`SequencerError::Todo`]) for an unknown ID, otherwise
    /// [`SequencerError::Closed`] or [`SequencerError::Timeout`].
    pub async fn remove(&self, id: ItemId) -> Result<ItemId, SequencerError> {
        let (command, reply) = Command::remove(self.next_trace_id(), id);
        Ok(self.submit(command, reply).await??)
    }

    /// Persists the current list
    ///
    /// # Errors
    ///
    /// The persistence error (as [`SequencerError::Todo`]), otherwise
    /// [`SequencerError::Closed`] or [`SequencerError::Timeout`].
    pub async fn save(&self) -> Result<(), SequencerError> {
        let (command, reply) = Command::save(self.next_trace_id());
        Ok(self.submit(command, reply).await??)
    }

    /// Persists the current list and stops the sequencer
    ///
    /// If persisting fails the sequencer keeps running and the call may be
    /// retried.
    ///
    /// # Errors
    ///
    /// The persistence error (as [`SequencerError::Todo`]), otherwise
    /// [`SequencerError::Closed`] or [`SequencerError::Timeout`].
    pub async fn shutdown(&self) -> Result<(), SequencerError> {
        let (command, reply) = Command::shutdown(self.next_trace_id());
        Ok(self.submit(command, reply).await??)
    }

    /// Races `request` against `cancel`
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use listkeeper_runtime::{SequencerError, SequencerHandle};
    /// # async fn example(handle: SequencerHandle) -> Result<(), SequencerError> {
    /// let (_cancel, cancelled) = tokio::sync::oneshot::channel::<()>();
    /// let items = SequencerHandle::until_cancelled(handle.get(), async {
    ///     let _ = cancelled.await;
    /// })
    /// .await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// [`SequencerError::Cancelled`] if `cancel` completes first; the command
    /// may still run. Otherwise whatever `request` returns.
    pub async fn until_cancelled<T>(
        request: impl Future<Output = Result<T, SequencerError>>,
        cancel: impl Future<Output = ()>,
    ) -> Result<T, SequencerError> {
        tokio::select! {
            result = request => result,
            () = cancel => Err(SequencerError::Cancelled),
        }
    }

    /// Returns true once the sequencer has stopped accepting commands
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Waits until the sequencer stops accepting commands
    pub async fn closed(&self) {
        self.sender.closed().await;
    }

    fn next_trace_id(&self) -> TraceId {
        self.trace_id.unwrap_or_default()
    }

    async fn submit<T>(
        &self,
        command: Command,
        reply: oneshot::Receiver<T>,
    ) -> Result<T, SequencerError> {
        let exchange = async {
            self.sender
                .send(command)
                .await
                .map_err(|_| SequencerError::Closed)?;
            reply.await.map_err(|_| SequencerError::Closed)
        };

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| SequencerError::Timeout)?,
            None => exchange.await,
        }
    }
}
