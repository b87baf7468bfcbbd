//! HTTP route handlers for the customers API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check
//! GET    /health/ready         - Readiness check (store ping)
//!
//! # Customers
//! GET    /customers            - Paginated list (?page, ?size, legacy ?limit)
//! GET    /customers?name=slug  - Exact-name lookup
//! POST   /customers            - Create
//! GET    /customers/{id}       - Get by id
//! PUT    /customers/{id}       - Partial update
//! DELETE /customers/{id}       - Delete
//! ```
//!
//! Anything else, including an unsupported method on a known path, falls
//! through to a JSON 404.

pub mod customers;
pub mod health;

use axum::{Router, routing::get};

use crate::error::AppError;
use crate::state::AppState;

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(customers::list).post(customers::create))
        .route(
            "/customers/{id}",
            get(customers::show)
                .put(customers::update)
                .delete(customers::delete),
        )
}

/// Create all routes for the customers API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(customer_routes())
        .method_not_allowed_fallback(route_not_found)
        .fallback(route_not_found)
}

async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}
