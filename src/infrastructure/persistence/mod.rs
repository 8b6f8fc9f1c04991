//! PostgreSQL repository implementations.
//!
//! # Repositories
//!
//! - [`PgUserRepository`] - User lookups by id or email

pub mod pg_user_repository;

pub use pg_user_repository::PgUserRepository;
