//! Authentication primitives shared across layers: token payloads,
//! the `Requester` capability and the error taxonomy of the pipeline.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{CachedUser, Role};

/// Claims embedded in a signed bearer token.
///
/// Expiry is not part of the payload: the provider takes it as an argument to
/// `generate`, signs it into the token's `exp` claim and reports it on
/// [`Token::expires_at`]. `validate` enforces it and returns only the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPayload {
    pub user_id: Uuid,
    pub role: Role,
}

impl TokenPayload {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// An issued bearer token together with its expiry (unix seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token: String,
    pub expires_at: i64,
}

/// Errors produced by the authentication pipeline.
///
/// Every variant is terminal for the request that produced it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("wrong authorization header")]
    MalformedAuthHeader,

    #[error("malformed token")]
    MalformedToken,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token has expired")]
    ExpiredToken,

    #[error("error encoding the token: {0}")]
    Encoding(String),

    #[error("user not found")]
    UserNotFound,

    #[error("could not resolve user: {0}")]
    UserResolution(String),

    #[error("user lookup timed out")]
    Timeout,

    #[error("user deleted or banned")]
    AccessDenied,

    #[error("too many requests, retry in {retry_after:?}")]
    RateLimitExceeded { retry_after: Duration },
}

/// Identity of the authenticated caller, available to downstream handlers.
pub trait Requester: Send + Sync {
    fn user_id(&self) -> Uuid;
    fn email(&self) -> &str;
    fn role(&self) -> Role;
}

/// [`Requester`] backed by a resolved user snapshot.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user: CachedUser,
}

impl AuthenticatedUser {
    pub fn new(user: CachedUser) -> Self {
        Self { user }
    }
}

impl Requester for AuthenticatedUser {
    fn user_id(&self) -> Uuid {
        self.user.id
    }

    fn email(&self) -> &str {
        &self.user.email
    }

    fn role(&self) -> Role {
        self.user.role
    }
}

/// Request-scoped handle to the authenticated caller.
///
/// Inserted into request extensions by the auth middleware; lives for one request.
#[derive(Clone)]
pub struct CurrentUser(pub Arc<dyn Requester>);

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("user_id", &self.0.user_id())
            .field("role", &self.0.role())
            .finish()
    }
}

impl std::ops::Deref for CurrentUser {
    type Target = dyn Requester;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

/// Issues and verifies signed bearer tokens.
///
/// Implementations are pure functions of the token string and a process-wide secret.
pub trait TokenProvider: Send + Sync {
    /// Signs `payload` into a token that expires `expiry_seconds` from now.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Encoding`] if the claims cannot be serialized or signed.
    fn generate(&self, payload: TokenPayload, expiry_seconds: i64) -> Result<Token, AuthError>;

    /// Verifies a token and returns the embedded payload verbatim.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MalformedToken`] if the string is not a well-formed signed token
    /// - [`AuthError::InvalidSignature`] if the signature does not match the secret
    /// - [`AuthError::ExpiredToken`] if `exp <= now`
    fn validate(&self, token: &str) -> Result<TokenPayload, AuthError>;
}
