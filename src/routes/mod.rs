//! HTTP route handlers.
//!
//! Four fixed GET routes: a greeting, liveness and readiness probes, and a
//! database round trip. None of them is cacheable, so every response carries
//! `Cache-Control: no-store`.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod db;
pub mod health;
pub mod home;

use axum::{middleware, routing::get, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Cache-Control value for every route
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

/// Registers the routes without binding them to state.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/db-test", get(db::db_test))
}

/// Binds the routes to `state` and adds the shared layers.
pub fn into_app(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ))
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}

/// Creates the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    into_app(routes(), state)
}
