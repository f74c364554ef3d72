//! Request ID middleware for correlating a checkout across services.
//!
//! The gateway assigns the ID; this service only carries it. When the
//! `x-request-id` header is present its value is recorded on the request
//! span, made available to handlers as a [`CorrelationId`] extension and
//! echoed on the response. Nothing is generated when it is absent.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The inbound request ID, if the caller sent one.
#[derive(Debug, Clone, Default)]
pub struct CorrelationId(pub Option<String>);

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| !id.is_empty())
        .map(String::from);

    if let Some(id) = &request_id {
        Span::current().record("request_id", id.as_str());
    }
    request
        .extensions_mut()
        .insert(CorrelationId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Some(value) = request_id.and_then(|id| HeaderValue::from_str(&id).ok()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
