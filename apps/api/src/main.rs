mod config;
mod errors;
mod layout;
mod llm_client;
mod models;
mod refinement;
mod render;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::refinement::TextRefiner;
use crate::render::DocumentBuilder;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));

    let refiner = TextRefiner::new(config.llm_settings());
    if !refiner.is_enabled() {
        info!("Experience details will be rendered as their first sentence");
    }

    match &config.logo_path {
        Some(path) if path.is_file() => info!("Logo: {}", path.display()),
        Some(path) => info!("Logo {} not found; rendering without it", path.display()),
        None => info!("Logo disabled"),
    }
    let builder = DocumentBuilder::new(config.logo_path.clone());

    let state = AppState {
        refiner: Arc::new(refiner),
        builder,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
