use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::core::{app_state::AppState, config, db};

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

pub fn init_env() {
    // A missing .env file is fine; real deployments set variables directly.
    dotenvy::dotenv().ok();
}

/// Loads configuration, builds the shared state and serves the router until
/// the process is stopped.
pub async fn bootstrap(service_name: &str, app: Router<AppState>) -> Result<()> {
    let config = config::load()?;

    let db_pool = db::connect(&config.database.url).await?;

    tokio::fs::create_dir_all(&config.uploads.dir)
        .await
        .context("Failed to create upload directory")?;

    let state = AppState {
        db_pool,
        config: Arc::new(config),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.http.port));
    let app = app.with_state(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("{} listening on {}", service_name, addr);

    axum::serve(listener, app)
        .await
        .context("HTTP server exited with an error")?;
    Ok(())
}
