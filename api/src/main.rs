mod config;
mod page;
mod query_payload;
mod rag_response;
mod utils;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use config::ServerSettings;
use doc_genie::{GeminiProvider, QueryService, Settings};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utils::{handle_ask, health, index_page};

#[derive(Clone)]
pub struct AppState {
    pub query_service: Arc<QueryService>,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/ask", post(handle_ask))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    if let Err(e) = run().await {
        eprintln!("Failed to start server: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let settings = Arc::new(Settings::from_env().context("loading settings")?);
    let server = ServerSettings::from_env().context("loading server settings")?;

    if !settings.has_credential() {
        log::warn!("GOOGLE_API_KEY is not set; uploads will fail until it is added to .env");
    }

    let provider = Arc::new(GeminiProvider::new(settings.gemini.clone()));
    let query_service = QueryService::new(settings, provider)?;
    log::info!("Document Genie ready");

    let app = router(
        AppState {
            query_service: Arc::new(query_service),
        },
        server.max_upload_bytes,
    );

    let listener = tokio::net::TcpListener::bind(&server.bind_addr)
        .await
        .with_context(|| format!("binding {}", server.bind_addr))?;
    println!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
