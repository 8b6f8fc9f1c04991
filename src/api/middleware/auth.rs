//! Bearer token authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use serde_json::json;
use std::sync::Arc;

use crate::domain::auth::CurrentUser;
use crate::{error::AppError, state::AppState};

/// Authenticates requests using Bearer tokens from the Authorization header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Authentication Flow
///
/// Runs [`crate::application::services::AuthService::authenticate`] and, on success,
/// inserts a [`CurrentUser`] into the request extensions before calling the handler.
/// Nothing is attached when any step fails.
///
/// # Errors
///
/// - `401 Unauthorized` for a missing or malformed header, a bad or expired token,
///   or a user that cannot be resolved
/// - `403 Forbidden` for deleted or banned users
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::get, middleware};
/// use crate::api::middleware::auth;
///
/// let protected = Router::new()
///     .route("/v1/users/me", get(me_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Non-UTF-8 header values are treated like a missing header.
    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let user = st.auth_service.authenticate(authorization.as_deref()).await?;

    req.extensions_mut().insert(CurrentUser(Arc::new(user)));

    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "request was not authenticated"}),
            )
        })
    }
}
