//! API route configuration.

use crate::api::handlers::{login_handler, me_handler, register_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes reachable without a token.
///
/// - `POST /users/register` - Create an account
/// - `POST /users/login` - Exchange credentials for a bearer token
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register_handler))
        .route("/users/login", post(login_handler))
}

/// Routes requiring a bearer token. Callers layer authentication and rate limiting.
///
/// - `GET /users/me` - The authenticated caller
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(me_handler))
}
