mod clipboard;
mod config;
mod controller;
mod generation;
mod models;
mod render;
mod routes;
mod submission;

use anyhow::Context;
use routes::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    clipboard::SystemClipboard, config::AppConfig, controller::SubmissionController,
    generation::GenerationClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env()?;
    let generation = GenerationClient::new(&config.api_base);
    tracing::info!("Generation service endpoint: {}", generation.endpoint());

    let state = AppState {
        controller: Arc::new(SubmissionController::new(
            Arc::new(generation),
            Arc::new(SystemClipboard),
        )),
    };

    let app = routes::router(state).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    tracing::info!(addr = %config.addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await
        .context("server error")?;
    Ok(())
}
