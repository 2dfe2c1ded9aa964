//! Axum middleware for request tracing.
//!
//! Every request gets a [`TraceId`]:
//!
//! 1. **Extract** it from the `X-Trace-ID` header, or generate a new one when the
//!    header is missing or not a UUID
//! 2. **Store** it in request extensions for handlers
//! 3. **Create** an `http_request` tracing span carrying it
//! 4. **Echo** it in the response `X-Trace-ID` header
//!
//! # Example
//!
//! ```
//! use axum::{Router, routing::get};
//! use listkeeper_web::middleware::trace_id_layer;
//!
//! let app: Router = Router::new()
//!     .route("/health", get(|| async { "ok" }))
//!     .layer(trace_id_layer());
//! ```

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    response::Response,
};
use listkeeper_core::TraceId;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for the trace ID.
pub const TRACE_ID_HEADER: &str = "X-Trace-ID";

/// Create a layer that assigns a trace ID to every request.
#[must_use]
pub const fn trace_id_layer() -> TraceIdLayer {
    TraceIdLayer
}

/// Layer for trace ID tracking.
#[derive(Clone, Debug)]
pub struct TraceIdLayer;

impl<S> Layer<S> for TraceIdLayer {
    type Service = TraceIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TraceIdMiddleware { inner }
    }
}

/// Middleware service for trace ID tracking.
#[derive(Clone, Debug)]
pub struct TraceIdMiddleware<S> {
    inner: S,
}

type ResponseFuture<R, E> = Pin<Box<dyn Future<Output = Result<R, E>> + Send>>;

impl<S> Service<Request> for TraceIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = ResponseFuture<Response, S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let trace_id = trace_id_from(req.headers()).unwrap_or_default();
        let span = tracing::info_span!(
            "http_request",
            %trace_id,
            method = %req.method(),
            path = req.uri().path(),
        );
        req.extensions_mut().insert(trace_id);

        let response = self.inner.call(req).instrument(span);
        Box::pin(async move {
            let mut response = response.await?;
            if let Some(value) = header_value(trace_id) {
                response.headers_mut().insert(TRACE_ID_HEADER, value);
            }
            Ok(response)
        })
    }
}

/// Parses the `X-Trace-ID` header, ignoring values that are not UUIDs.
pub(crate) fn trace_id_from(headers: &HeaderMap) -> Option<TraceId> {
    let raw = headers.get(TRACE_ID_HEADER)?.to_str().ok()?;
    Uuid::parse_str(raw.trim()).ok().map(TraceId::from_uuid)
}

fn header_value(trace_id: TraceId) -> Option<HeaderValue> {
    let mut buf = Uuid::encode_buffer();
    HeaderValue::from_str(trace_id.as_uuid().hyphenated().encode_lower(&mut buf)).ok()
}
