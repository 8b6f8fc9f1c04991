//! HTTP server initialization and runtime setup.
//!
//! Builds the process-wide collaborators once, serves until a shutdown signal, then
//! lets them drop.

use crate::application::services::{AuthService, UserCache, UserService};
use crate::config::Config;
use crate::infrastructure::cache::{Cache, MemoryCache, RedisCache};
use crate::infrastructure::persistence::PgUserRepository;
use crate::infrastructure::rate_limit::FixedWindowLimiter;
use crate::infrastructure::security::{JwtTokenProvider, Sha256Hasher};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// How often expired cache entries and stale rate windows are swept.
const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(60);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Redis cache (or in-process cache)
/// - Token provider, user cache and rate limiter
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    let cache: Arc<dyn Cache> = match &config.redis_url {
        Some(redis_url) => match RedisCache::connect(redis_url).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using MemoryCache.", e);
                in_process_cache()
            }
        },
        None => {
            tracing::info!("Cache enabled (in-process)");
            in_process_cache()
        }
    };

    let user_repository = Arc::new(PgUserRepository::new(Arc::new(pool.clone())));
    let token_provider = Arc::new(JwtTokenProvider::new(&config.jwt_secret));

    let user_cache = Arc::new(
        UserCache::new(cache.clone(), user_repository.clone())
            .with_ttl(config.user_cache_ttl())
            .with_timeout(config.lookup_timeout()),
    );

    let auth_service = Arc::new(AuthService::new(token_provider.clone(), user_cache));
    let user_service = Arc::new(UserService::new(
        user_repository,
        Arc::new(Sha256Hasher),
        token_provider,
        config.token_expiry_seconds,
    ));

    let rate_limiter =
        FixedWindowLimiter::new(config.rate_limit_requests, config.rate_limit_period());
    rate_limiter.start_cleanup_task(HOUSEKEEPING_INTERVAL);

    let state = AppState {
        auth_service,
        user_service,
        cache,
        rate_limiter,
        behind_proxy: config.behind_proxy,
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

fn in_process_cache() -> Arc<dyn Cache> {
    let cache = MemoryCache::new();
    cache.start_purge_task(HOUSEKEEPING_INTERVAL);
    Arc::new(cache)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
