//! Request IDs for tracing and correlation.
//!
//! Every request gets an ID: the incoming `x-request-id` header when an
//! upstream proxy set one, a new UUID v4 otherwise. The ID is recorded on the
//! request span, tagged on the Sentry scope, and echoed in the response.

use axum::{
    extract::Request,
    http::{HeaderValue, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest inbound ID accepted as-is.
const MAX_REQUEST_ID_LENGTH: usize = 128;

/// A request's ID, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    /// The inbound ID from `parts`, or a fresh one.
    fn from_parts(parts: &Parts) -> Self {
        let inbound = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LENGTH);

        Self(inbound.map_or_else(|| Uuid::new_v4().to_string(), String::from))
    }
}

/// Build the span for one request, with empty `request_id` and `username`
/// fields for later layers to fill in.
pub fn make_request_span(request: &Request) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
        username = tracing::field::Empty,
    )
}

/// Middleware that ensures every request has a request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let request_id = RequestId::from_parts(&parts);

    Span::current().record("request_id", request_id.0.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id.0);
    });

    parts.extensions.insert(request_id.clone());
    let mut response = next.run(Request::from_parts(parts, body)).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.0) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(REQUEST_ID_HEADER, value);
        }
        builder.body(Body::empty()).unwrap().into_parts().0
    }

    #[test]
    fn test_inbound_id_is_kept() {
        assert_eq!(
            RequestId::from_parts(&parts(Some("abc-123"))),
            RequestId("abc-123".to_string())
        );
    }

    #[test]
    fn test_missing_id_is_generated() {
        let id = RequestId::from_parts(&parts(None));
        assert!(Uuid::parse_str(&id.0).is_ok());
    }

    #[test]
    fn test_oversized_id_is_replaced() {
        let long = "x".repeat(MAX_REQUEST_ID_LENGTH + 1);
        let id = RequestId::from_parts(&parts(Some(&long)));
        assert_ne!(id.0, long);
        assert!(Uuid::parse_str(&id.0).is_ok());
    }
}
