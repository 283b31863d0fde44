use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use panel::auth::{FileStore, TokenStore};
use panel::backend::BackendClient;
use panel::config::Config;
use panel::routes::build_router;
use panel::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Panel v{}", env!("CARGO_PKG_VERSION"));

    // Credential storage
    let tokens = TokenStore::new(Arc::new(FileStore::new(&config.token_store_path)));
    info!(
        "Token store at {} (authenticated: {})",
        config.token_store_path.display(),
        tokens.is_authenticated().await
    );

    // Remote backend client
    let backend = BackendClient::from_config(&config, tokens.clone())
        .context("Failed to build backend HTTP client")?;
    info!(
        "Backend client initialized ({}, {:?} mode, host {:?}, demo {})",
        backend.base_url(),
        config.backend_mode,
        config.host_environment,
        config.demo_mode
    );

    let state = AppState {
        config: config.clone(),
        backend: Arc::new(backend),
        tokens,
    };

    // The side panel is served from an extension origin.
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
