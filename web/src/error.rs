//! Error types for web handlers.
//!
//! This module maps sequencer and validation errors to HTTP responses,
//! implementing Axum's `IntoResponse` trait.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use listkeeper_core::{TodoError, ValidationError};
use listkeeper_runtime::SequencerError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// Converts into a JSON `{"code", "message"}` body with the matching status.
///
/// # Examples
///
/// ```
/// use axum::http::StatusCode;
/// use listkeeper_core::{ItemId, TodoError};
/// use listkeeper_runtime::SequencerError;
/// use listkeeper_web::AppError;
///
/// let err = AppError::from(SequencerError::from(TodoError::NotFound(ItemId::new(7))));
/// assert_eq!(err.status(), StatusCode::NOT_FOUND);
/// assert_eq!(err.code(), "NOT_FOUND");
/// ```
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    /// Safe to show to the client
    message: String,
    /// Logged, never sent
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create an error with an explicit status and code.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying error for logging.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// 400, for malformed requests.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// 400, for a name or due date that failed validation.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    /// 404 for an unknown resource.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{resource} with id {id} not found"),
        )
    }

    /// 408, when the sequencer did not answer in time.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::REQUEST_TIMEOUT, "TIMEOUT", message)
    }

    /// 500. Pair with [`with_source`](Self::with_source).
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            message,
        )
    }

    /// 503, once the sequencer stops taking commands.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", message)
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                code = self.code,
                message = %self.message,
                error = self.source.as_ref().map(tracing::field::display),
                "Request failed"
            );
        } else {
            tracing::debug!(status = %self.status, code = self.code, message = %self.message, "Request rejected");
        }

        let body = ErrorBody {
            code: self.code,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<TodoError> for AppError {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::NotFound(id) => Self::not_found("item", id),
            TodoError::Validation(err) => err.into(),
            err @ (TodoError::Io { .. } | TodoError::Decode { .. } | TodoError::Encode(_)) => {
                Self::internal("failed to persist the list").with_source(err.into())
            }
            err @ TodoError::IdsExhausted(_) => {
                Self::internal("no item ids left").with_source(err.into())
            }
        }
    }
}

impl From<SequencerError> for AppError {
    fn from(err: SequencerError) -> Self {
        match err {
            SequencerError::Todo(err) => err.into(),
            SequencerError::Closed => Self::unavailable("the list is shutting down"),
            SequencerError::Cancelled => Self::unavailable("the request was cancelled"),
            SequencerError::Timeout => Self::timeout("timed out waiting for the list"),
            err @ (SequencerError::Startup(_) | SequencerError::Config(_)) => {
                Self::internal("An internal error occurred").with_source(err.into())
            }
        }
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listkeeper_core::ItemId;

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_not_found_mapping() {
        let err = AppError::from(SequencerError::from(TodoError::NotFound(ItemId::new(3))));
        assert_eq!(err.to_string(), "[NOT_FOUND] item with id 3 not found");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_mapping() {
        let err = AppError::from(SequencerError::from(TodoError::from(
            ValidationError::EmptyName,
        )));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "VALIDATION_ERROR");
        assert_eq!(err.message, "name cannot be empty");
    }

    #[test]
    fn test_closed_and_timeout_mapping() {
        assert_eq!(
            AppError::from(SequencerError::Closed).status,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::from(SequencerError::Timeout).status,
            StatusCode::REQUEST_TIMEOUT
        );
    }

    #[test]
    fn test_exhausted_ids_mapping() {
        let err = AppError::from(SequencerError::from(TodoError::IdsExhausted(ItemId::new(
            u64::MAX,
        ))));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_io_mapping_keeps_source() {
        let io = TodoError::io("todos.json", std::io::Error::other("disk full"));
        let err = AppError::from(SequencerError::from(io));

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.message.contains("disk full"));
    }
}
