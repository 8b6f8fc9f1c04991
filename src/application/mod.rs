//! Application layer services.
//!
//! Services coordinate repositories, the cache medium and the token provider, and
//! expose a small API to the HTTP layer.
//!
//! # Available Services
//!
//! - [`services::user_cache::UserCache`] - Cache-aside user lookup with miss deduplication
//! - [`services::auth_service::AuthService`] - Bearer token authentication pipeline
//! - [`services::user_service::UserService`] - Login and token issuance

pub mod services;
