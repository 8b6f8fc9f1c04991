//! Business logic services for the application layer.

pub mod auth_service;
pub mod user_cache;
pub mod user_service;

pub use auth_service::{AuthService, extract_bearer_token};
pub use user_cache::{UserCache, UserCacheError, cache_key};
pub use user_service::UserService;
