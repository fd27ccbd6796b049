//! HTTP server: axum router wiring and startup.

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::ai::LlmClient;
use crate::client::PubMedClient;
use crate::config::Config;
use crate::icite::IciteClient;

/// Shared state for HTTP handlers.
///
/// Clients are constructed once at startup from the immutable [`Config`];
/// per-request state (the Paper lists) never outlives its request.
pub struct AppState {
    /// E-utilities client.
    pub pubmed: PubMedClient,

    /// Citation-count collaborator.
    pub icite: IciteClient,

    /// LLM collaborator.
    pub llm: LlmClient,
}

impl AppState {
    /// Build the shared state from the process configuration.
    ///
    /// # Errors
    ///
    /// Returns error if any HTTP client fails to initialize.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            pubmed: PubMedClient::new(config)?,
            icite: IciteClient::new(config)?,
            llm: LlmClient::new(config)?,
        })
    }
}

/// Create the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/search", get(handlers::search))
        .route("/api/paper/{pmid}", get(handlers::get_paper))
        .route("/api/generate-query", post(handlers::generate_query))
        .route("/api/analyze/keywords", get(handlers::analyze_keywords))
        .route("/api/analyze/trends", get(handlers::analyze_trends))
        .route("/api/analyze/authors", get(handlers::analyze_authors))
        .route("/api/analyze/ir", post(handlers::detect_ir))
        .route("/api/summarize", post(handlers::summarize))
        .route("/api/chat", post(handlers::chat))
        .route("/api/export/csv", get(handlers::export_csv))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until shutdown.
///
/// # Errors
///
/// Returns error on bind or serve failure.
pub async fn serve(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let router = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("HTTP server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("HTTP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.expect("Failed to install CTRL+C handler");
    tracing::info!("Received shutdown signal");
}
