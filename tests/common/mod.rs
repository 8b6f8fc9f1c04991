#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use todo_auth::application::services::{AuthService, UserCache, UserService};
use todo_auth::domain::auth::{TokenPayload, TokenProvider};
use todo_auth::domain::entities::{NewUser, Role, Status, User};
use todo_auth::domain::repositories::{RepositoryError, UserFilter, UserRepository};
use todo_auth::infrastructure::cache::MemoryCache;
use todo_auth::infrastructure::rate_limit::FixedWindowLimiter;
use todo_auth::infrastructure::security::{JwtTokenProvider, Sha256Hasher, hash_password};
use todo_auth::state::AppState;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// In-memory backing store counting every lookup.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<Uuid, User>>,
    calls: AtomicUsize,
}

impl InMemoryUserRepository {
    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn set_status(&self, id: Uuid, status: Status) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.status = status;
        }
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_user(&self, filter: UserFilter) -> Result<User, RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let users = self.users.lock().unwrap();
        let found = match filter {
            UserFilter::Id(id) => users.get(&id).cloned(),
            UserFilter::Email(email) => users.values().find(|u| u.email == email).cloned(),
        };

        found.ok_or(RepositoryError::NotFound)
    }

    async fn save(&self, user: &NewUser) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Duplicate);
        }

        let now = Utc::now();
        users.insert(
            user.id,
            User {
                id: user.id,
                email: user.email.clone(),
                password_hash: user.password_hash.clone(),
                salt: user.salt.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                role: user.role,
                status: Status::Active,
                created_at: Some(now),
                updated_at: Some(now),
            },
        );
        Ok(())
    }
}

pub fn make_user(email: &str, role: Role, status: Status) -> User {
    let salt = format!("salt-{}", email);
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: hash_password(&Sha256Hasher, TEST_PASSWORD, &salt),
        salt,
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        role,
        status,
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    }
}

pub struct TestContext {
    pub state: AppState,
    pub repo: Arc<InMemoryUserRepository>,
    pub cache: MemoryCache,
    pub tokens: Arc<JwtTokenProvider>,
    pub user_cache: Arc<UserCache>,
}

impl TestContext {
    pub fn bearer_for(&self, user: &User) -> String {
        let token = self
            .tokens
            .generate(TokenPayload::new(user.id, user.role), 3600)
            .unwrap();
        format!("Bearer {}", token.token)
    }
}

/// Builds application state over in-memory collaborators.
pub fn create_test_state(rate_limit: u32, period: Duration) -> TestContext {
    let repo = Arc::new(InMemoryUserRepository::default());
    let cache = MemoryCache::new();
    let tokens = Arc::new(JwtTokenProvider::new(TEST_SECRET));

    let user_cache = Arc::new(UserCache::new(Arc::new(cache.clone()), repo.clone()));
    let auth_service = Arc::new(AuthService::new(tokens.clone(), user_cache.clone()));
    let user_service = Arc::new(UserService::new(
        repo.clone(),
        Arc::new(Sha256Hasher),
        tokens.clone(),
        3600,
    ));

    let state = AppState {
        auth_service,
        user_service,
        cache: Arc::new(cache.clone()),
        rate_limiter: FixedWindowLimiter::new(rate_limit, period),
        behind_proxy: false,
    };

    TestContext {
        state,
        repo,
        cache,
        tokens,
        user_cache,
    }
}
