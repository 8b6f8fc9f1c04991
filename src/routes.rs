//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`          - Health check (public)
//! - `POST /v1/users/register` - Registration (public)
//! - `POST /v1/users/login`  - Login (public)
//! - `GET  /v1/users/me`     - Current user (rate limited, Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-client fixed window, checked before authentication
//! - **Authentication** - Bearer token pipeline attaching the current user
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Routes and middleware, without path normalization.
pub fn api_router(state: AppState) -> Router {
    // Route layers run outermost-last: the rate limiter sees the request before auth.
    let protected = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ));

    let v1 = Router::new()
        .merge(api::routes::public_routes())
        .merge(protected);

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", v1)
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(api_router(state))
}
