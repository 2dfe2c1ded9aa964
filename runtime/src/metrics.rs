//! Prometheus metrics for observability and monitoring.
//!
//! This module provides metric collection for:
//! - Sequencer command processing
//! - List persistence (load and save)
//!
//! Metrics are recorded through the `metrics` facade and are no-ops until a
//! recorder is installed.
//!
//! # Example
//!
//! ```rust,no_run
//! use listkeeper_runtime::metrics::MetricsRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let recorder = MetricsRecorder::install()?;
//!
//! // Later, e.g. from a `/metrics` handler
//! if let Some(text) = recorder.render() {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use listkeeper_core::OpKind;
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use thiserror::Error;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, gauge, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Installed Prometheus recorder.
///
/// Rendering is left to the caller (the web crate serves it at `/metrics`).
#[derive(Clone)]
pub struct MetricsRecorder {
    handle: Option<PrometheusHandle>,
}

impl MetricsRecorder {
    /// Register metric descriptions and install the global recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// If a recorder is already installed (e.g., in tests), the returned
    /// recorder has no handle and [`render`](Self::render) returns `None`.
    pub fn install() -> Result<Self, MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                tracing::info!("Metrics recorder installed");
                Ok(Self {
                    handle: Some(handle),
                })
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(Self { handle: None })
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Get the Prometheus handle, if this call installed the recorder.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    // Sequencer Metrics
    describe_counter!(
        "sequencer_commands_total",
        "Total number of commands processed by the sequencer"
    );
    describe_counter!(
        "sequencer_command_errors_total",
        "Total number of commands that replied with an error"
    );
    describe_histogram!(
        "sequencer_command_duration_seconds",
        "Time taken to process a command"
    );
    describe_gauge!("sequencer_items", "Number of items currently in the list");

    // Persistence Metrics
    describe_counter!(
        "persistence_loads_total",
        "Total number of successful list loads"
    );
    describe_counter!(
        "persistence_saves_total",
        "Total number of successful list saves"
    );
    describe_counter!(
        "persistence_save_errors_total",
        "Total number of failed list saves"
    );
    describe_gauge!(
        "persistence_items",
        "Number of items in the last loaded or saved list"
    );
    describe_histogram!(
        "persistence_load_duration_seconds",
        "Time taken to load the list"
    );
    describe_histogram!(
        "persistence_save_duration_seconds",
        "Time taken to save the list"
    );
}

/// Sequencer metrics recorder.
pub struct SequencerMetrics;

impl SequencerMetrics {
    /// Record a processed command.
    pub fn record_command(op: OpKind, duration: Duration) {
        counter!("sequencer_commands_total", "op" => op.as_str()).increment(1);
        histogram!("sequencer_command_duration_seconds", "op" => op.as_str())
            .record(duration.as_secs_f64());
    }

    /// Record a command that replied with an error.
    pub fn record_error(op: OpKind) {
        counter!("sequencer_command_errors_total", "op" => op.as_str()).increment(1);
    }

    /// Record the current list length.
    #[allow(clippy::cast_precision_loss)] // lists never approach 2^52 items
    pub fn record_items(count: usize) {
        gauge!("sequencer_items").set(count as f64);
    }
}

/// Persistence metrics recorder.
pub struct PersistenceMetrics;

impl PersistenceMetrics {
    /// Record a successful load of `items` items.
    #[allow(clippy::cast_precision_loss)]
    pub fn record_load(items: usize, duration: Duration) {
        counter!("persistence_loads_total").increment(1);
        histogram!("persistence_load_duration_seconds").record(duration.as_secs_f64());
        gauge!("persistence_items").set(items as f64);
    }

    /// Record a successful save of `items` items.
    #[allow(clippy::cast_precision_loss)]
    pub fn record_save(items: usize, duration: Duration) {
        counter!("persistence_saves_total").increment(1);
        histogram!("persistence_save_duration_seconds").record(duration.as_secs_f64());
        gauge!("persistence_items").set(items as f64);
    }

    /// Record a failed save.
    pub fn record_save_error() {
        counter!("persistence_save_errors_total").increment(1);
    }
}
