//! DTOs for user endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::auth::{Requester, Token};
use crate::domain::entities::Role;

/// Account details posted to the registration endpoint.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,

    #[serde(default)]
    #[validate(length(max = 100))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 100))]
    pub last_name: String,
}

/// Id of the created account.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub data: Uuid,
}

/// Credentials posted to the login endpoint.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Issued access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub data: Token,
}

/// The authenticated caller as seen by handlers.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl ProfileResponse {
    pub fn from_requester(requester: &dyn Requester) -> Self {
        Self {
            id: requester.user_id(),
            email: requester.email().to_string(),
            role: requester.role(),
        }
    }
}
