mod config;
mod errors;
mod llm_client;
mod routes;
mod rubric;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::rubric::catalog::CriterionCatalog;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Rubric API v{}", env!("CARGO_PKG_VERSION"));

    // Criterion catalog: file override or built-in table
    let catalog = match &config.criteria_catalog_path {
        Some(path) => {
            let catalog = CriterionCatalog::from_json_file(path)?;
            info!("Loaded {} criteria from {path}", catalog.len());
            catalog
        }
        None => CriterionCatalog::default(),
    };
    info!("Criterion catalog ready ({} criteria)", catalog.len());

    // Initialize completion client (credentials are supplied per request)
    let llm = LlmClient::new(
        config.completion_api_url.clone(),
        Duration::from_secs(config.completion_timeout_secs),
    )?;
    info!("Completion client initialized (endpoint: {})", llm.api_url());
    if config.default_api_key.is_none() {
        info!("GROQ_API_KEY not set; requests must carry their own api_key");
    }
    info!("Blank table cells: {:?}", config.blank_cells);

    // Build app state
    let state = AppState {
        config: config.clone(),
        catalog: Arc::new(catalog),
        completion: Arc::new(llm),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
