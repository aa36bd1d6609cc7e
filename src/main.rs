//! Battlekeep Engine - Backend API for tabletop encounter tracking
//!
//! The Engine is the backend server that:
//! - Keeps a directory of reusable characters and monsters
//! - Runs one initiative-ordered encounter per campaign
//! - Persists everything to a namespaced key-value store (memory or SQLite)
//! - Pulls monster stat blocks from an optional remote catalog

mod application;
mod domain;
mod infrastructure;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http;
use crate::infrastructure::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "battlekeep_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Battlekeep Engine");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Storage: {} (namespace {})", config.storage.backend, config.storage.namespace);
    tracing::info!(
        "  Monster catalog: {}",
        config.monster_catalog.url.as_deref().unwrap_or("not configured")
    );
    let port = config.server_port;

    // Initialize application state
    let state = AppState::new(config).await?;
    let state = Arc::new(state);
    tracing::info!("Application state initialized");

    // Warm the monster catalog cache; failures are kept for the UI to show
    let catalog_warmup = {
        let state = state.clone();
        tokio::spawn(async move {
            let snapshot = state.monster_catalog_service.refresh().await;
            match snapshot.error {
                Some(error) => tracing::warn!("{}", error),
                None => tracing::info!("Loaded {} monsters", snapshot.monsters.len()),
            }
        })
    };

    // Build the router
    let app = Router::new()
        .route("/health", get(health_check))
        // Merge REST API routes
        .merge(http::create_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let server = axum::serve(listener, app);

    // Wait for shutdown signal (Ctrl+C)
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            catalog_warmup.abort();
        }
    }

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
