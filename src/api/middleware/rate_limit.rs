//! Fixed-window rate limiting middleware.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use tracing::warn;

use crate::domain::auth::AuthError;
use crate::utils::client_ip::client_key;
use crate::{error::AppError, state::AppState};

/// Counts the request against the caller's window and rejects it once the window
/// is full.
///
/// # Limits
///
/// Configured via `RATE_LIMIT_REQUESTS` per `RATE_LIMIT_PERIOD_SECONDS`
/// (default: 3 requests per 5 seconds) per client address.
///
/// Requests exceeding the limit receive `429 Too Many Requests` with a
/// `Retry-After` header and never reach the handler.
///
/// # Key Extraction
///
/// The socket peer address, or the proxy headers when `BEHIND_PROXY` is set.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/v1/users/me", get(me_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let key = client_key(req.headers(), peer, st.behind_proxy);
    let decision = st.rate_limiter.check(&key);

    if !decision.allowed {
        warn!(client = %key, path = %req.uri().path(), "Rate limit exceeded");
        return Err(AuthError::RateLimitExceeded {
            retry_after: decision.retry_after,
        }
        .into());
    }

    Ok(next.run(req).await)
}
