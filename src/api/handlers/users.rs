//! Handlers for user endpoints.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::users::{
    LoginRequest, LoginResponse, ProfileResponse, RegisterRequest, RegisterResponse,
};
use crate::domain::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Creates an account.
///
/// # Endpoint
///
/// `POST /v1/users/register`
///
/// # Request Body
///
/// ```json
/// { "email": "jane@example.com", "password": "...", "first_name": "Jane", "last_name": "Doe" }
/// ```
///
/// # Errors
///
/// - 400 Bad Request for malformed input
/// - 409 Conflict if the email is already registered
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    payload.validate()?;

    let id = state
        .user_service
        .register(
            &payload.email,
            &payload.password,
            &payload.first_name,
            &payload.last_name,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { data: id })))
}

/// Exchanges credentials for a bearer token.
///
/// # Endpoint
///
/// `POST /v1/users/login`
///
/// # Request Body
///
/// ```json
/// { "email": "jane@example.com", "password": "..." }
/// ```
///
/// # Errors
///
/// - 400 Bad Request for malformed input or invalid credentials
/// - 403 Forbidden for deleted or banned users
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    payload.validate()?;

    let token = state
        .user_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(LoginResponse { data: token }))
}

/// Returns the authenticated caller.
///
/// # Endpoint
///
/// `GET /v1/users/me` (Bearer token required, rate limited)
pub async fn me_handler(user: CurrentUser) -> Json<ProfileResponse> {
    Json(ProfileResponse::from_requester(&*user))
}
