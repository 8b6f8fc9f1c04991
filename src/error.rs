//! HTTP-facing error type.
//!
//! Every failure leaving a handler or middleware is an [`AppError`], rendered as
//!
//! ```json
//! { "error": { "code": "unauthorized", "message": "...", "details": {} } }
//! ```

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use std::time::Duration;

use crate::domain::auth::AuthError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    Unauthorized { message: String, details: Value },
    Forbidden { message: String, details: Value },
    Conflict { message: String, details: Value },
    TooManyRequests { message: String, retry_after: Duration },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn too_many_requests(retry_after: Duration) -> Self {
        Self::TooManyRequests {
            message: "Too many requests".to_string(),
            retry_after,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        let reason = e.to_string();
        match e {
            AuthError::MalformedAuthHeader => AppError::unauthorized(
                "Unauthorized",
                json!({"reason": reason, "kind": "malformed_auth_header"}),
            ),
            AuthError::MalformedToken => AppError::unauthorized(
                "Unauthorized",
                json!({"reason": reason, "kind": "malformed_token"}),
            ),
            AuthError::InvalidSignature => AppError::unauthorized(
                "Unauthorized",
                json!({"reason": reason, "kind": "invalid_signature"}),
            ),
            AuthError::ExpiredToken => AppError::unauthorized(
                "Unauthorized",
                json!({"reason": reason, "kind": "expired_token"}),
            ),
            AuthError::UserNotFound => AppError::unauthorized(
                "Unauthorized",
                json!({"reason": reason, "kind": "user_not_found"}),
            ),
            // Backend details stay in the logs.
            AuthError::UserResolution(_) | AuthError::Timeout => AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "could not resolve user", "kind": "user_resolution"}),
            ),
            AuthError::AccessDenied => {
                AppError::forbidden("Forbidden", json!({"reason": reason, "kind": "access_denied"}))
            }
            AuthError::RateLimitExceeded { retry_after } => {
                AppError::too_many_requests(retry_after)
            }
            AuthError::Encoding(_) => AppError::internal("Could not issue token", json!({})),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::bad_request("Validation failed", json!(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (code, message, details, retry_after) = match self {
            AppError::Validation { message, details } => {
                ("validation_error", message, details, None)
            }
            AppError::Unauthorized { message, details } => {
                ("unauthorized", message, details, None)
            }
            AppError::Forbidden { message, details } => ("forbidden", message, details, None),
            AppError::Conflict { message, details } => ("conflict", message, details, None),
            AppError::TooManyRequests {
                message,
                retry_after,
            } => (
                "too_many_requests",
                message,
                json!({"retry_after_seconds": retry_after.as_secs()}),
                Some(retry_after),
            ),
            AppError::Internal { message, details } => {
                ("internal_error", message, details, None)
            }
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        if let Some(retry_after) = retry_after {
            // Round up so clients never retry inside the current window.
            let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }

        response
    }
}
