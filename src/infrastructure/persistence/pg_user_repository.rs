//! PostgreSQL implementation of the user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{NewUser, Role, Status, User};
use crate::domain::repositories::{RepositoryError, UserFilter, UserRepository};

const SELECT_USER: &str = r#"
    SELECT id, email, password, salt, first_name, last_name, role, status, created_at, updated_at
    FROM users
"#;

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password: String,
    salt: String,
    first_name: Option<String>,
    last_name: Option<String>,
    role: i32,
    status: i16,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            password_hash: row.password,
            salt: row.salt,
            first_name: row.first_name.unwrap_or_default(),
            last_name: row.last_name.unwrap_or_default(),
            role: Role::from_db(row.role),
            status: Status::from_db(row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL repository for user records.
pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_user(&self, filter: UserFilter) -> Result<User, RepositoryError> {
        let row = match filter {
            UserFilter::Id(id) => {
                sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = $1"))
                    .bind(id)
                    .fetch_optional(self.pool.as_ref())
                    .await?
            }
            UserFilter::Email(email) => {
                sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE email = $1"))
                    .bind(email)
                    .fetch_optional(self.pool.as_ref())
                    .await?
            }
        };

        row.map(User::from).ok_or(RepositoryError::NotFound)
    }

    async fn save(&self, user: &NewUser) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password, salt, first_name, last_name, role, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.salt)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_db())
        .bind(Status::Active.as_db())
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
