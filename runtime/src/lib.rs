//! # Listkeeper Runtime
//!
//! Runtime for the listkeeper list store.
//!
//! This crate provides the sequencer that owns the list and the file codec
//! that persists it.
//!
//! ## Core Components
//!
//! - **Sequencer**: single task that owns the list and drains the command channel
//! - **`SequencerHandle`**: cloneable, typed client for submitting commands
//! - **`JsonFileCodec`**: atomic JSON file persistence
//! - **Metrics**: counters and histograms for commands and persistence
//!
//! ## Example
//!
//! ```no_run
//! use listkeeper_core::NewItem;
//! use listkeeper_runtime::{JsonFileCodec, Sequencer, SequencerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = Sequencer::start(JsonFileCodec::new("todos.json"), SequencerConfig::default()).await?;
//!
//! let item = handle.add(NewItem::new("Buy milk", "01-01-2025")?).await?;
//! let items = handle.get().await?;
//! assert_eq!(items[0].id, item.id);
//!
//! handle.shutdown().await?;
//! # Ok(())
//! # }
//! ```

/// JSON file persistence
pub mod codec;

/// Prometheus metrics for observability
pub mod metrics;

/// The sequencer actor and its handle
pub mod sequencer;

/// Error types for the sequencer
pub mod error {
    use listkeeper_core::TodoError;
    use thiserror::Error;

    /// Errors returned to callers of the sequencer
    #[derive(Error, Debug)]
    pub enum SequencerError {
        /// The command ran and failed for a domain or persistence reason
        #[error(transparent)]
        Todo(#[from] TodoError),

        /// Loading the list failed, so the sequencer never started
        ///
        /// Proceeding on unreadable data risks silently overwriting it.
        #[error("sequencer failed to start: {0}")]
        Startup(#[source] TodoError),

        /// The configuration was rejected
        #[error("invalid sequencer configuration: {0}")]
        Config(String),

        /// The sequencer is no longer accepting commands
        ///
        /// Returned after shutdown, or when the command was dropped unanswered
        /// because the sequencer stopped while it was queued.
        #[error("sequencer is no longer accepting commands")]
        Closed,

        /// The caller's deadline passed before a reply arrived
        ///
        /// The command may still be executed.
        #[error("timed out waiting for the sequencer")]
        Timeout,

        /// The caller's cancellation fired before a reply arrived
        ///
        /// The command may still be executed.
        #[error("request cancelled before the sequencer replied")]
        Cancelled,
    }

    impl SequencerError {
        /// Returns the domain error, if this is one
        #[must_use]
        pub const fn as_todo(&self) -> Option<&TodoError> {
            match self {
                Self::Todo(err) | Self::Startup(err) => Some(err),
                _ => None,
            }
        }

        /// Returns true when a command referenced an unknown ID
        #[must_use]
        pub const fn is_not_found(&self) -> bool {
            matches!(self, Self::Todo(TodoError::NotFound(_)))
        }
    }
}

/// Sequencer configuration
pub mod config {
    use super::SequencerError;
    use std::time::Duration;

    /// Configuration for a sequencer
    ///
    /// # Example
    ///
    /// ```
    /// use listkeeper_runtime::SequencerConfig;
    /// use std::time::Duration;
    ///
    /// let config = SequencerConfig::default()
    ///     .with_channel_capacity(256)
    ///     .with_request_timeout(Duration::from_secs(2));
    /// assert!(config.validate().is_ok());
    /// ```
    #[derive(Debug, Clone)]
    pub struct SequencerConfig {
        /// Number of commands that may queue before senders wait
        pub channel_capacity: usize,
        /// Deadline applied by handles to each request, if any
        pub request_timeout: Option<Duration>,
    }

    impl SequencerConfig {
        /// Create a new configuration with custom values
        #[must_use]
        pub const fn new(channel_capacity: usize, request_timeout: Option<Duration>) -> Self {
            Self {
                channel_capacity,
                request_timeout,
            }
        }

        /// Set the command channel capacity
        #[must_use]
        pub const fn with_channel_capacity(mut self, capacity: usize) -> Self {
            self.channel_capacity = capacity;
            self
        }

        /// Set the per-request deadline
        #[must_use]
        pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
            self.request_timeout = Some(timeout);
            self
        }

        /// Check the configuration
        ///
        /// # Errors
        ///
        /// Returns [`SequencerError::Config`] for a zero channel capacity or a
        /// zero request timeout.
        pub fn validate(&self) -> Result<(), SequencerError> {
            if self.channel_capacity == 0 {
                return Err(SequencerError::Config(
                    "channel_capacity must be > 0".to_string(),
                ));
            }
            if self.request_timeout.is_some_and(|timeout| timeout.is_zero()) {
                return Err(SequencerError::Config(
                    "request_timeout must be > 0".to_string(),
                ));
            }
            Ok(())
        }
    }

    impl Default for SequencerConfig {
        fn default() -> Self {
            Self {
                channel_capacity: 64,
                request_timeout: None,
            }
        }
    }
}

pub use codec::JsonFileCodec;
pub use config::SequencerConfig;
pub use error::SequencerError;
pub use sequencer::{Sequencer, SequencerHandle};
