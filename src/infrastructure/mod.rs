//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`cache`] - Cache media (in-process and Redis)
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`security`] - JWT signing and password hashing
//! - [`rate_limit`] - Fixed-window request limiter

pub mod cache;
pub mod persistence;
pub mod rate_limit;
pub mod security;
