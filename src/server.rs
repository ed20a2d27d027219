//! Server bootstrap for producto-api.
//!
//! This module wires together:
//! - configuration (environment variables, read once)
//! - the storage backend selected by the repository factory
//! - the auth middleware state
//! - the Axum router, with graceful shutdown draining

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use chrono::Duration;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use crate::albums::AlbumsClient;
use crate::auth::{ApiKeyVerifier, AuthMethod, AuthState, JwtVerifier};
use crate::infra::{Backend, DbProvider, ProductRepository, UserRepository};

/// Default URL for the external albums API.
pub const DEFAULT_ALBUMS_URL: &str = "https://jsonplaceholder.typicode.com/albums";

/// Immutable configuration, loaded once at startup and passed explicitly
/// into the factory, middleware, and handlers.
#[derive(Debug, Clone)]
pub struct Config {
    /// Storage variant selector.
    pub db_provider: DbProvider,
    /// MongoDB connection string (mongo variant only).
    pub mongo_uri: String,
    /// Flat-file database path (json variant only).
    pub json_db_path: PathBuf,
    /// Authentication strategy for the protected routes.
    pub auth_method: AuthMethod,
    /// Shared secret for the api-key strategy.
    pub api_key: String,
    /// HMAC secret for signing and verifying JWTs.
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expires_in_secs: i64,
    /// External albums API URL.
    pub albums_url: String,
    /// Server listen address.
    pub listen_addr: SocketAddr,
    /// Allowed CORS origins; empty means any origin.
    pub cors_allow_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unknown `DB_PROVIDER` or `AUTH_METHOD` values are fatal here, before
    /// anything listens.
    pub fn from_env() -> anyhow::Result<Self> {
        let db_provider: DbProvider = std::env::var("DB_PROVIDER")
            .unwrap_or_else(|_| "json".to_string())
            .parse()
            .map_err(anyhow::Error::msg)?;

        let auth_method: AuthMethod = std::env::var("AUTH_METHOD")
            .unwrap_or_else(|_| "both".to_string())
            .parse()
            .map_err(anyhow::Error::msg)?;

        let mongo_uri = std::env::var("MONGO_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017/producto_api".to_string());

        let json_db_path: PathBuf = std::env::var("JSON_DB_PATH")
            .unwrap_or_else(|_| "database/database.json".to_string())
            .into();

        let api_key = std::env::var("API_KEY").unwrap_or_default();

        let jwt_secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".to_string());

        let jwt_expires_in_secs: i64 = std::env::var("JWT_EXPIRES_IN_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        let albums_url =
            std::env::var("ALBUMS_API_URL").unwrap_or_else(|_| DEFAULT_ALBUMS_URL.to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);
        let listen_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid listen address {host}:{port}: {e}"))?;

        let cors_allow_origins: Vec<String> = std::env::var("CORS_ALLOW_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            db_provider,
            mongo_uri,
            json_db_path,
            auth_method,
            api_key,
            jwt_secret,
            jwt_expires_in_secs,
            albums_url,
            listen_addr,
            cors_allow_origins,
        })
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub products: Arc<dyn ProductRepository>,
    pub users: Arc<dyn UserRepository>,
    pub jwt: Arc<JwtVerifier>,
    pub albums: Arc<AlbumsClient>,
}

/// Assemble the full application router.
pub fn build_router(state: AppState) -> Router {
    let auth_state = AuthState {
        method: state.config.auth_method,
        api_key: Arc::new(ApiKeyVerifier::new(state.config.api_key.clone())),
        jwt: state.jwt.clone(),
    };

    let cors = cors_layer(&state.config.cors_allow_origins);

    Router::new()
        .nest("/api/v1", crate::api::router(auth_state))
        .route("/health", get(crate::api::health))
        .fallback(crate::api::fallback)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let parsed = origins.iter().filter_map(|o| o.parse().ok());
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    info!("starting producto-api v{}", env!("CARGO_PKG_VERSION"));
    info!("  db provider: {}", config.db_provider.as_str());
    info!("  auth method: {}", config.auth_method.as_str());

    let backend =
        Backend::connect(config.db_provider, &config.mongo_uri, &config.json_db_path).await?;

    let jwt = Arc::new(JwtVerifier::new(
        config.jwt_secret.as_bytes(),
        Duration::seconds(config.jwt_expires_in_secs),
    ));
    let albums = Arc::new(AlbumsClient::new(config.albums_url.clone()));

    let state = AppState {
        products: backend.products.clone(),
        users: backend.users.clone(),
        jwt,
        albums,
        config: Arc::new(config.clone()),
    };

    let app = build_router(state);

    info!("listening on http://{}", config.listen_addr);
    info!("API available under http://{}/api/v1", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // In-flight requests have drained; now release the backend connection.
    backend.disconnect().await;
    info!("shutdown complete");

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}

/// Resolve when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("SIGINT received, shutting down"),
        () = terminate => info!("SIGTERM received, shutting down"),
    }
}
