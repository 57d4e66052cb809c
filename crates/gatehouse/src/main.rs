mod app;
mod config;
mod handlers;
mod state;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use gatehouse_auth::{AuthConfig, AuthState};
use gatehouse_core::auth::SessionRepository;
use listenfd::ListenFd;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    app::{create_app, normalize_prefix},
    config::Config,
    state::AppState,
};

/// Gatehouse - Sign-in gateway for Microsoft identity platform tenants
#[derive(Parser, Debug)]
#[command(name = "gatehouse")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "3000", env = "PORT")]
    port: u16,

    /// Global route prefix, including the API version
    #[arg(long, default_value = "/api/v1", env = "ROUTE_PREFIX")]
    prefix: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "gatehouse=debug,gatehouse_auth=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let prefix = normalize_prefix(&cli.prefix);
    let config = Config::from_env()?;

    // Missing provider settings are fatal here, before anything listens.
    let auth_config = AuthConfig::from_env()?.with_route_prefix(&prefix);
    let sessions = init_session_store(&config).await?;
    let auth = AuthState::new(sessions, auth_config)?;

    #[cfg(feature = "auth-mock")]
    spawn_mock_idp(auth.config.provider.redirect_uri.clone());

    let state = AppState::new(auth, config)?;

    // Build the application router
    let app = create_app(state, &prefix);

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // If we are given a tcp listener on listen fd 0, use that one
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        // Otherwise fall back to CLI-specified host:port
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr).await?
        }
    };

    tracing::info!(prefix = %prefix, "listening on {}", listener.local_addr()?);

    // Run the server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// SQLite-backed sessions at `SQLITE_PATH`.
#[cfg(feature = "auth-sqlite")]
async fn init_session_store(config: &Config) -> Result<Arc<dyn SessionRepository>> {
    use std::str::FromStr;

    use gatehouse_auth::SqliteSessionStore;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", config.sqlite_path))?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    let store = SqliteSessionStore::new(pool);
    store.migrate().await?;

    tracing::info!(path = %config.sqlite_path, "Using SQLite session store");
    Ok(Arc::new(store))
}

/// Redis-backed sessions at `REDIS_URL`.
#[cfg(all(feature = "auth-redis", not(feature = "auth-sqlite")))]
async fn init_session_store(config: &Config) -> Result<Arc<dyn SessionRepository>> {
    use fred::prelude::{Builder, Config as RedisConfig};
    use gatehouse_auth::RedisSessionStore;

    let pool = Builder::from_config(RedisConfig::from_url(&config.redis_url)?).build_pool(5)?;
    pool.init().await?;

    tracing::info!("Using Redis session store");
    Ok(Arc::new(RedisSessionStore::new(pool)))
}

#[cfg(not(any(feature = "auth-sqlite", feature = "auth-redis")))]
async fn init_session_store(_config: &Config) -> Result<Arc<dyn SessionRepository>> {
    tracing::warn!("Using in-memory session store; sessions are lost on restart");
    Ok(Arc::new(gatehouse_auth::InMemorySessionStore::new()))
}

#[cfg(feature = "auth-mock")]
fn spawn_mock_idp(redirect_uri: url::Url) {
    tokio::spawn(async move {
        let server = gatehouse_auth::mock_idp::MockIdpServer::new(3001, redirect_uri);
        if let Err(e) = server.run().await {
            tracing::error!(error = %e, "Mock IdP server failed");
        }
    });
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
