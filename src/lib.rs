//! # To-do Auth
//!
//! The request-authentication pipeline of the to-do backend, served with Axum.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Users, token payloads, the `Requester` capability
//!   and repository traits
//! - **Application Layer** ([`application`]) - User cache, authentication pipeline, login
//! - **Infrastructure Layer** ([`infrastructure`]) - Cache media, PostgreSQL, JWT,
//!   rate limiter
//! - **API Layer** ([`api`]) - Handlers, DTOs, and middleware
//!
//! ## Request Flow
//!
//! 1. Rate limiter counts the request against the client's fixed window
//! 2. Bearer token is extracted and verified
//! 3. The user is resolved through the cache, with one database read per miss
//! 4. Deleted or banned users are rejected
//! 5. The handler receives the caller as [`domain::auth::CurrentUser`]
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{AuthService, UserCache, UserService};
    pub use crate::domain::auth::{AuthError, CurrentUser, Requester, TokenPayload, TokenProvider};
    pub use crate::domain::entities::{CachedUser, Role, Status, User};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
