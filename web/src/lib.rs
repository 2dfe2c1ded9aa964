//! Axum HTTP boundary for listkeeper.
//!
//! The handlers are thin: they validate input, submit one command to the
//! sequencer and map its reply to a response. All list logic stays behind the
//! [`SequencerHandle`](listkeeper_runtime::SequencerHandle).
//!
//! # Request Flow
//!
//! 1. **Trace ID** assigned by [`trace_id_layer`]
//! 2. **Extract** query or JSON body
//! 3. **Validate** names and due dates
//! 4. **Submit** the command through the sequencer handle
//! 5. **Map** the reply or [`AppError`] to a response
//!
//! # Routes
//!
//! | Route | Method | Success |
//! |-------|--------|---------|
//! | `/get` | GET | 200, JSON array of items |
//! | `/create` | POST | 201, `{"status":"success","item":{..}}` |
//! | `/update` | PATCH | 200, `{"status":"success","item":{..}}` |
//! | `/delete?id=N` | DELETE | 200, `{"status":"success","id":N}` |
//! | `/save` | POST | 200, `{"status":"success"}` |
//! | `/health` | GET | 200, `ok` |
//! | `/metrics` | GET | 200, Prometheus text |
//!
//! # Example
//!
//! ```no_run
//! use listkeeper_runtime::{JsonFileCodec, Sequencer, SequencerConfig};
//! use listkeeper_web::{AppState, router};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sequencer = Sequencer::start(JsonFileCodec::new("todos.json"), SequencerConfig::default()).await?;
//! let app = router(AppState::new(sequencer));
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::RequestTrace;
pub use middleware::{TRACE_ID_HEADER, trace_id_layer};
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/get", get(handlers::items::list_items))
        .route("/create", post(handlers::items::create_item))
        .route("/update", patch(handlers::items::update_item))
        .route("/delete", delete(handlers::items::delete_item))
        .route("/save", post(handlers::items::save_items))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::health::metrics))
        .layer(TraceLayer::new_for_http())
        .layer(trace_id_layer())
        .with_state(state)
}
