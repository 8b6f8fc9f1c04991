//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use crate::application::services::{AuthService, UserService};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::rate_limit::FixedWindowLimiter;

/// Process-wide collaborators, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub cache: Arc<dyn Cache>,
    pub rate_limiter: FixedWindowLimiter,
    /// Read the client address from proxy headers instead of the socket peer.
    pub behind_proxy: bool,
}
