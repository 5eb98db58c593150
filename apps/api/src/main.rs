mod bundle;
mod config;
mod directory;
mod errors;
mod export;
mod models;
mod routes;
mod state;
mod verify;

use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::bundle::DocumentBundler;
use crate::config::Config;
use crate::directory::DirectoryClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::verify::VerifyClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting document API v{}", env!("CARGO_PKG_VERSION"));

    // One HTTP client per external collaborator, all with a bounded timeout
    // so a hung fetch cannot stall an export forever.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()?;

    let directory = DirectoryClient::new(http.clone(), config.directory_api_base.clone());
    info!("Directory client initialized ({})", config.directory_api_base);

    let verify = VerifyClient::new(
        http.clone(),
        config.verify_api_base.clone(),
        config.verify_api_key.clone(),
    );
    info!("Verification client initialized");

    let bundler = DocumentBundler::new(http);

    let state = AppState {
        config: config.clone(),
        directory,
        verify,
        bundler,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
