mod analysis;
mod config;
mod drafts;
mod errors;
mod models;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::client::AnalysisClient;
use crate::analysis::guard::InFlightRegistry;
use crate::config::Config;
use crate::drafts::{DraftStore, MemoryDraftStore, RedisDraftStore};
use crate::routes::build_router;
use crate::state::AppState;

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

    info!("Starting ResumeMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize draft store
    let drafts: Arc<dyn DraftStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisDraftStore::connect(url, config.session_ttl_secs).await?),
        None => {
            info!("REDIS_URL not set, keeping session drafts in memory");
            Arc::new(MemoryDraftStore::new(Duration::from_secs(
                config.session_ttl_secs,
            )))
        }
    };

    // Initialize scoring service client
    let analysis = AnalysisClient::new(
        &config.analysis_api_url,
        Duration::from_secs(config.analysis_timeout_secs),
    )?;
    info!(
        "Analysis client initialized (endpoint: {}, timeout: {}s)",
        analysis.endpoint(),
        config.analysis_timeout_secs
    );

    // Build app state
    let state = AppState {
        drafts,
        analysis,
        in_flight: InFlightRegistry::new(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the front-end host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
