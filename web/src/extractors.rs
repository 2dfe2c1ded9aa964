//! Custom Axum extractors.

use crate::middleware::trace_id_from;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use listkeeper_core::TraceId;

/// Trace ID of the current request.
///
/// Uses the ID stored by [`trace_id_layer`](crate::middleware::trace_id_layer).
/// Without the layer, falls back to the `X-Trace-ID` header, then to a fresh ID.
///
/// # Example
///
/// ```
/// use listkeeper_web::extractors::RequestTrace;
///
/// async fn handler(RequestTrace(trace_id): RequestTrace) -> String {
///     format!("Trace ID: {trace_id}")
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequestTrace(pub TraceId);

#[async_trait]
impl<S> FromRequestParts<S> for RequestTrace
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(trace_id) = parts.extensions.get::<TraceId>() {
            return Ok(Self(*trace_id));
        }

        Ok(Self(trace_id_from(&parts.headers).unwrap_or_default()))
    }
}
