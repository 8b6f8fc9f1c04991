//! User entity and the cached snapshot used by the authentication pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Account role carried in tokens and user records.
///
/// Stored as a bit flag in the `users.role` column (`1` = user, `2` = admin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Decodes the database representation. Unknown flags fall back to [`Role::User`].
    pub fn from_db(value: i32) -> Self {
        match value {
            2 => Role::Admin,
            _ => Role::User,
        }
    }

    pub fn as_db(self) -> i32 {
        match self {
            Role::User => 1,
            Role::Admin => 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Admin => f.write_str("admin"),
        }
    }
}

/// Lifecycle status of an account.
///
/// `Deleted` also covers banned accounts; such users must never pass authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Deleted = 0,
    Active = 1,
    Done = 2,
}

impl Status {
    /// Decodes the database representation. Unknown values are treated as active.
    pub fn from_db(value: i16) -> Self {
        match value {
            0 => Status::Deleted,
            2 => Status::Done,
            _ => Status::Active,
        }
    }

    pub fn as_db(self) -> i16 {
        self as i16
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Deleted => f.write_str("deleted"),
            Status::Active => f.write_str("active"),
            Status::Done => f.write_str("done"),
        }
    }
}

/// A user record as stored in the backing database.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub status: Status,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Returns true if the account is deleted or banned.
    pub fn is_deleted(&self) -> bool {
        self.status == Status::Deleted
    }
}

/// A user about to be inserted. The password is already salted and hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Snapshot of a user held by the user cache.
///
/// Values are handed out by copy; callers never see the instance owned by the cache medium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub role: Role,
    pub status: Status,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CachedUser {
    /// Returns true if the snapshot says the account is deleted or banned.
    pub fn is_deleted(&self) -> bool {
        self.status == Status::Deleted
    }
}

impl From<User> for CachedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            password_hash: user.password_hash,
            salt: user.salt,
            role: user.role,
            status: user.status,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(status: Status) -> User {
        User {
            id: Uuid::new_v4(),
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

    #[test]
    fn test_role_db_mapping() {
        assert_eq!(Role::from_db(1), Role::User);
        assert_eq!(Role::from_db(2), Role::Admin);
        assert_eq!(Role::from_db(42), Role::User);
        assert_eq!(Role::from_db(Role::Admin.as_db()), Role::Admin);
    }

    #[test]
    fn test_status_db_mapping() {
        assert_eq!(Status::from_db(0), Status::Deleted);
        assert_eq!(Status::from_db(1), Status::Active);
        assert_eq!(Status::Deleted.as_db(), 0);
        assert_eq!(Status::from_db(2), Status::Done);
        assert_eq!(Status::Deleted as i16, 0);
    }

    #[test]
    fn test_cached_user_from_user() {
        let user = sample_user(Status::Active);
        let cached = CachedUser::from(user.clone());

        assert_eq!(cached.id, user.id);
        assert_eq!(cached.email, user.email);
        assert_eq!(cached.role, Role::Admin);
        assert!(!cached.is_deleted());
    }

    #[test]
    fn test_deleted_status() {
        assert!(sample_user(Status::Deleted).is_deleted());
        assert!(CachedUser::from(sample_user(Status::Deleted)).is_deleted());
        assert!(!sample_user(Status::Done).is_deleted());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(Role::User.to_string(), "user");
    }
}
