//! Repository trait for user lookups against the backing store.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{NewUser, User};

/// Selects which user to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    Id(Uuid),
    Email(String),
}

/// Errors returned by user repositories.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    Duplicate,

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => RepositoryError::Duplicate,
            other => RepositoryError::Database(other.to_string()),
        }
    }
}

/// Access to user records.
///
/// This is the slow source of truth consulted by
/// [`crate::application::services::UserCache`] on a cache miss and by login.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUserRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Loads a single user matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if no user matches.
    /// Returns [`RepositoryError::Database`] on storage errors.
    async fn get_user(&self, filter: UserFilter) -> Result<User, RepositoryError>;

    /// Inserts a new active user.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Duplicate`] if the email is already taken.
    /// Returns [`RepositoryError::Database`] on storage errors.
    async fn save(&self, user: &NewUser) -> Result<(), RepositoryError>;
}
