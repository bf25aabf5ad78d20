use crate::page::INDEX_HTML;
use crate::query_payload::AskPayload;
use crate::rag_response::{ApiError, AskResponse};
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    response::Html,
    Json,
};
use doc_genie::Severity;
use serde_json::{json, Value};
use std::time::Instant;
use uuid::Uuid;

pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn handle_ask(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AskResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let start = Instant::now();

    let payload = AskPayload::from_multipart(multipart).await.map_err(|e| {
        log::warn!("[{}] Rejected upload: {}", request_id, e);
        e
    })?;

    log::info!(
        "[{}] Received {} ({} bytes), question: {}",
        request_id,
        payload.file_name.as_deref().unwrap_or("<unnamed>"),
        payload.pdf.len(),
        payload.question.as_deref().map_or(false, |q| !q.trim().is_empty())
    );

    let outcome = state
        .query_service
        .process(payload.pdf, payload.question.as_deref())
        .await
        .map_err(|e| {
            match e.severity() {
                Severity::Warning => log::warn!("[{}] {}", request_id, e),
                Severity::Error => log::error!("[{}] {}", request_id, e),
            }
            ApiError::from(e)
        })?;

    let elapsed = start.elapsed().as_millis();
    log::info!(
        "[{}] Done in {}ms ({} chunks indexed)",
        request_id,
        elapsed,
        outcome.chunks_indexed()
    );

    Ok(Json(AskResponse::from_outcome(outcome, elapsed)))
}
