//! HTTP middleware stack for the server.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, added by the binary)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (fills `request_id` on the span, echoes the header)
//! 4. `RequireAuth` extractor on protected handlers (fills `username`)

pub mod auth;
pub mod request_id;

pub use auth::RequireAuth;
pub use request_id::{REQUEST_ID_HEADER, RequestId, make_request_span, request_id_middleware};
