//! Bearer-token authentication pipeline.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::application::services::user_cache::{UserCache, UserCacheError};
use crate::domain::auth::{AuthError, AuthenticatedUser, TokenProvider};

/// Authenticates requests carrying `Authorization: Bearer <token>`.
///
/// # Authentication Flow
///
/// 1. Extract the token from the header value
/// 2. Validate signature and expiry via [`TokenProvider`]
/// 3. Resolve the user through [`UserCache`]
/// 4. Reject deleted or banned accounts
/// 5. Hand back an [`AuthenticatedUser`] for the request context
///
/// Each step either passes its output on or ends the pipeline with an [`AuthError`].
/// The status check runs on every request, cached snapshot or not.
pub struct AuthService {
    tokens: Arc<dyn TokenProvider>,
    users: Arc<UserCache>,
}

impl AuthService {
    pub fn new(tokens: Arc<dyn TokenProvider>, users: Arc<UserCache>) -> Self {
        Self { tokens, users }
    }

    /// Runs the full pipeline on a raw `Authorization` header value.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MalformedAuthHeader`] if the header is missing or not `Bearer <token>`
    /// - [`AuthError::MalformedToken`], [`AuthError::InvalidSignature`],
    ///   [`AuthError::ExpiredToken`] from token validation, unchanged
    /// - [`AuthError::UserNotFound`], [`AuthError::UserResolution`], [`AuthError::Timeout`]
    ///   if the user cannot be resolved
    /// - [`AuthError::AccessDenied`] if the account is deleted or banned
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
    ) -> Result<AuthenticatedUser, AuthError> {
        let token = extract_bearer_token(authorization)?;

        let payload = self.tokens.validate(token)?;

        let user = self
            .users
            .get_user(payload.user_id)
            .await
            .map_err(|e| match e {
                UserCacheError::NotFound => {
                    debug!(user_id = %payload.user_id, "Token subject does not exist");
                    AuthError::UserNotFound
                }
                UserCacheError::Timeout(_) => AuthError::Timeout,
                UserCacheError::Backend(msg) => {
                    warn!(user_id = %payload.user_id, "User resolution failed: {}", msg);
                    AuthError::UserResolution(msg)
                }
            })?;

        if user.is_deleted() {
            debug!(user_id = %user.id, "Rejected deleted or banned user");
            return Err(AuthError::AccessDenied);
        }

        Ok(AuthenticatedUser::new(user))
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme must be exactly `Bearer`, followed by one space and a non-empty token
/// without whitespace.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MalformedAuthHeader)?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or(AuthError::MalformedAuthHeader)?;

    if scheme != "Bearer" || token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::MalformedAuthHeader);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::{Requester, TokenPayload};
    use crate::domain::entities::{Role, Status, User};
    use crate::domain::repositories::{MockUserRepository, RepositoryError, UserFilter};
    use crate::infrastructure::cache::MemoryCache;
    use crate::infrastructure::security::JwtTokenProvider;
    use chrono::Utc;
    use std::sync::Mutex;
    use uuid::Uuid;

    const SECRET: &str = "pipeline-test-secret";

    fn sample_user(id: Uuid, status: Status) -> User {
        User {
            id,
            email: "jane@example.com".to_string(),
            password_hash: "hash".to_string(),
            salt: "salt".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            role: Role::Admin,
            status,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    fn service_with(repo: MockUserRepository) -> (AuthService, Arc<JwtTokenProvider>) {
        let tokens = Arc::new(JwtTokenProvider::new(SECRET));
        let users = Arc::new(UserCache::new(Arc::new(MemoryCache::new()), Arc::new(repo)));
        (AuthService::new(tokens.clone(), users), tokens)
    }

    fn bearer(tokens: &JwtTokenProvider, id: Uuid) -> String {
        let token = tokens
            .generate(TokenPayload::new(id, Role::Admin), 3600)
            .unwrap();
        format!("Bearer {}", token.token)
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(Some("Bearer abc")), Ok("abc"));
    }

    #[test]
    fn test_extract_rejects_malformed_headers() {
        for header in [
            None,
            Some(""),
            Some("Token abc"),
            Some("Bearer "),
            Some("Bearer"),
            Some("bearer abc"),
            Some("Bearer  abc"),
            Some("Bearer abc def"),
        ] {
            assert_eq!(
                extract_bearer_token(header),
                Err(AuthError::MalformedAuthHeader),
                "header {:?}",
                header
            );
        }
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_get_user()
            .withf(move |filter| *filter == UserFilter::Id(id))
            .times(1)
            .returning(move |_| Ok(sample_user(id, Status::Active)));

        let (service, tokens) = service_with(repo);

        let requester = service
            .authenticate(Some(&bearer(&tokens, id)))
            .await
            .unwrap();

        assert_eq!(requester.user_id(), id);
        assert_eq!(requester.email(), "jane@example.com");
        assert_eq!(requester.role(), Role::Admin);
    }

    #[tokio::test]
    async fn test_undecodable_token_is_malformed() {
        let (service, _) = service_with(MockUserRepository::new());

        let result = service.authenticate(Some("Bearer xyz")).await;

        assert_eq!(result.unwrap_err(), AuthError::MalformedToken);
    }

    #[tokio::test]
    async fn test_foreign_signature_rejected_before_lookup() {
        let (service, _) = service_with(MockUserRepository::new());
        let foreign = JwtTokenProvider::new("another-secret");

        let result = service
            .authenticate(Some(&bearer(&foreign, Uuid::new_v4())))
            .await;

        assert_eq!(result.unwrap_err(), AuthError::InvalidSignature);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let (service, tokens) = service_with(MockUserRepository::new());
        let token = tokens
            .generate(TokenPayload::new(Uuid::new_v4(), Role::User), -5)
            .unwrap();

        let result = service
            .authenticate(Some(&format!("Bearer {}", token.token)))
            .await;

        assert_eq!(result.unwrap_err(), AuthError::ExpiredToken);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user()
            .returning(|_| Err(RepositoryError::NotFound));

        let (service, tokens) = service_with(repo);

        let result = service
            .authenticate(Some(&bearer(&tokens, Uuid::new_v4())))
            .await;

        assert_eq!(result.unwrap_err(), AuthError::UserNotFound);
    }

    #[tokio::test]
    async fn test_backing_failure_is_resolution_error() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user()
            .returning(|_| Err(RepositoryError::Database("pool timed out".to_string())));

        let (service, tokens) = service_with(repo);

        let result = service
            .authenticate(Some(&bearer(&tokens, Uuid::new_v4())))
            .await;

        assert!(matches!(result, Err(AuthError::UserResolution(_))));
    }

    #[tokio::test]
    async fn test_deleted_user_denied() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_get_user()
            .returning(move |_| Ok(sample_user(id, Status::Deleted)));

        let (service, tokens) = service_with(repo);

        let result = service.authenticate(Some(&bearer(&tokens, id))).await;

        assert_eq!(result.unwrap_err(), AuthError::AccessDenied);
    }

    /// A user cached as active and deleted afterwards keeps passing until the snapshot
    /// expires or is invalidated; a snapshot cached as deleted is rejected on every hit.
    #[tokio::test]
    async fn test_status_checked_against_cached_snapshot() {
        let id = Uuid::new_v4();
        let stored = Arc::new(Mutex::new(Status::Active));

        let mut repo = MockUserRepository::new();
        let current = stored.clone();
        repo.expect_get_user()
            .times(2)
            .returning(move |_| Ok(sample_user(id, *current.lock().unwrap())));

        let tokens = Arc::new(JwtTokenProvider::new(SECRET));
        let users = Arc::new(UserCache::new(Arc::new(MemoryCache::new()), Arc::new(repo)));
        let service = AuthService::new(tokens.clone(), users.clone());
        let header = bearer(&tokens, id);

        assert!(service.authenticate(Some(&header)).await.is_ok());

        *stored.lock().unwrap() = Status::Deleted;
        assert!(service.authenticate(Some(&header)).await.is_ok());

        users.invalidate(id).await;
        assert_eq!(
            service.authenticate(Some(&header)).await.unwrap_err(),
            AuthError::AccessDenied
        );
        // Served from the cached deleted snapshot, still rejected.
        assert_eq!(
            service.authenticate(Some(&header)).await.unwrap_err(),
            AuthError::AccessDenied
        );
    }
}
