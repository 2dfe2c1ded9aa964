//! Application state for Axum handlers.

use listkeeper_runtime::SequencerHandle;
use metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across all HTTP handlers.
///
/// Cloning is cheap: the sequencer handle is a channel sender and the
/// Prometheus handle is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Client for the list sequencer
    pub sequencer: SequencerHandle,
    /// Renders `/metrics`; `None` when metrics are disabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state without metrics.
    #[must_use]
    pub const fn new(sequencer: SequencerHandle) -> Self {
        Self {
            sequencer,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `/metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: PrometheusHandle) -> Self {
        self.metrics = Some(metrics);
        self
    }
}
