//! Registration and login: account creation, credential check and token issuance.

use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::domain::auth::{Token, TokenPayload, TokenProvider};
use crate::domain::entities::{NewUser, Role};
use crate::domain::repositories::{RepositoryError, UserFilter, UserRepository};
use crate::error::AppError;
use crate::infrastructure::security::{Hasher, generate_salt, hash_password, verify_password};

/// Registers users and issues tokens to users presenting valid credentials.
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn Hasher>,
    tokens: Arc<dyn TokenProvider>,
    token_expiry_seconds: i64,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        hasher: Arc<dyn Hasher>,
        tokens: Arc<dyn TokenProvider>,
        token_expiry_seconds: i64,
    ) -> Self {
        Self {
            repository,
            hasher,
            tokens,
            token_expiry_seconds,
        }
    }

    /// Creates an active account with the default role and returns its id.
    ///
    /// The password is stored as `hash(password + salt)` with a fresh random salt.
    ///
    /// # Errors
    ///
    /// - [`AppError::Conflict`] if the email is already registered
    /// - [`AppError::Internal`] on storage failures
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Uuid, AppError> {
        match self
            .repository
            .get_user(UserFilter::Email(email.to_string()))
            .await
        {
            Ok(_) => return Err(email_taken(email)),
            Err(RepositoryError::NotFound) => {}
            Err(e) => {
                error!("Registration lookup failed: {}", e);
                return Err(AppError::internal("Database error", json!({})));
            }
        }

        let salt = generate_salt();
        let user = NewUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: hash_password(self.hasher.as_ref(), password, &salt),
            salt,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role: Role::User,
        };

        match self.repository.save(&user).await {
            Ok(()) => {}
            // Lost a race with a concurrent registration of the same email.
            Err(RepositoryError::Duplicate) => return Err(email_taken(email)),
            Err(e) => {
                error!("Failed to save user: {}", e);
                return Err(AppError::internal("Cannot create user", json!({})));
            }
        }

        info!(user_id = %user.id, "User registered");

        Ok(user.id)
    }

    /// Verifies `email`/`password` and returns a signed token.
    ///
    /// Unknown emails and wrong passwords produce the same error so callers cannot
    /// probe for registered addresses.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for invalid credentials
    /// - [`AppError::Forbidden`] for deleted or banned accounts
    /// - [`AppError::Internal`] on storage or signing failures
    pub async fn login(&self, email: &str, password: &str) -> Result<Token, AppError> {
        let user = match self
            .repository
            .get_user(UserFilter::Email(email.to_string()))
            .await
        {
            Ok(user) => user,
            Err(RepositoryError::NotFound) => {
                debug!("Login for unknown email");
                return Err(invalid_credentials());
            }
            Err(e) => {
                error!("Login lookup failed: {}", e);
                return Err(AppError::internal("Database error", json!({})));
            }
        };

        if !verify_password(self.hasher.as_ref(), password, &user.salt, &user.password_hash) {
            debug!(user_id = %user.id, "Login with wrong password");
            return Err(invalid_credentials());
        }

        if user.is_deleted() {
            return Err(AppError::forbidden(
                "Forbidden",
                json!({"reason": "user deleted or banned"}),
            ));
        }

        let token = self
            .tokens
            .generate(TokenPayload::new(user.id, user.role), self.token_expiry_seconds)?;

        info!(user_id = %user.id, "User logged in");

        Ok(token)
    }
}

fn invalid_credentials() -> AppError {
    AppError::bad_request("email or password invalid", json!({}))
}

fn email_taken(email: &str) -> AppError {
    AppError::conflict("email has already existed", json!({"email": email}))
}
