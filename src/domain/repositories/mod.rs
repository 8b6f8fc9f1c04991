//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated via
//! `mockall` for testing.

pub mod user_repository;

pub use user_repository::{RepositoryError, UserFilter, UserRepository};

#[cfg(test)]
pub use user_repository::MockUserRepository;
