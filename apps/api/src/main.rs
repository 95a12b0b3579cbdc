mod config;
mod errors;
mod extraction;
mod generation;
mod llm_client;
mod render;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::ResumeGenerator;
use crate::llm_client::LlmClient;
use crate::render::{probe_available, EngineKind, PdfRenderer, ProcessEngine, RegisteredEngine};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS Resume Builder API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client (API key arrives per request)
    let llm = LlmClient::new(config.llm_api_url.clone(), config.llm_timeout)?;
    info!(
        "LLM client initialized (model: {}, endpoint: {})",
        llm_client::MODEL,
        config.llm_api_url
    );

    // Resolve rendering engines once; availability is never re-probed
    let renderer = build_renderer(&config).await;

    let state = AppState {
        generator: ResumeGenerator::new(llm),
        renderer: Arc::new(renderer),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the engine chain in configured order, probing each binary.
async fn build_renderer(config: &Config) -> PdfRenderer {
    let mut engines = Vec::with_capacity(config.pdf_engines.len());

    for &kind in &config.pdf_engines {
        let bin = match kind {
            EngineKind::WeasyPrint => &config.weasyprint_bin,
            EngineKind::Wkhtmltopdf => &config.wkhtmltopdf_bin,
        };
        let available = probe_available(kind, bin).await;
        let engine = ProcessEngine::new(kind, bin.clone(), config.render_timeout);
        engines.push(RegisteredEngine::new(Arc::new(engine), available));
    }

    if !engines.iter().any(|e| e.available) {
        warn!("No PDF engine available; downloads will fall back to client-side conversion");
    }

    PdfRenderer::new(engines, config.pdf_min_bytes)
}
