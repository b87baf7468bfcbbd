//! HTTP middleware stack for the customers API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `CorsLayer` (permissive; the browser client runs on another origin)
//! 3. `TraceLayer` (request span with method, uri, status, latency)
//! 4. Request ID (read or generate `x-request-id`, record it on the span)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
