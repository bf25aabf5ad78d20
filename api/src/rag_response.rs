use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use doc_genie::{ErrorResponse, GenieError, Outcome, SearchHit, Severity};
use serde::Serialize;
use thiserror::Error;

const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub chunks_indexed: usize,
    pub sources: Vec<SourceExcerpt>,
    pub processing_time_ms: u128,
}

#[derive(Debug, Serialize)]
pub struct SourceExcerpt {
    pub chunk: usize,
    pub score: f32,
    pub excerpt: String,
}

impl From<&SearchHit> for SourceExcerpt {
    fn from(hit: &SearchHit) -> Self {
        let excerpt = if hit.content.chars().count() > EXCERPT_CHARS {
            format!("{}...", hit.content.chars().take(EXCERPT_CHARS).collect::<String>())
        } else {
            hit.content.clone()
        };

        Self {
            chunk: hit.position,
            score: hit.score,
            excerpt,
        }
    }
}

impl AskResponse {
    pub fn from_outcome(outcome: Outcome, processing_time_ms: u128) -> Self {
        match outcome {
            Outcome::Indexed { chunks } => Self {
                status: "indexed".to_string(),
                answer: None,
                chunks_indexed: chunks,
                sources: Vec::new(),
                processing_time_ms,
            },
            Outcome::Answered(answer) => Self {
                status: "answered".to_string(),
                sources: answer.retrieved.iter().map(SourceExcerpt::from).collect(),
                answer: Some(answer.text),
                chunks_indexed: answer.chunks_indexed,
                processing_time_ms,
            },
        }
    }
}

/// Everything a request to `/ask` can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Please upload a PDF file.")]
    NotPdf,

    #[error("{message}")]
    Upload { status: StatusCode, message: String },

    #[error(transparent)]
    Genie(#[from] GenieError),
}

impl ApiError {
    pub fn upload(err: axum::extract::multipart::MultipartError) -> Self {
        ApiError::Upload {
            status: err.status(),
            message: format!("Failed to read upload: {}", err.body_text()),
        }
    }
}

fn genie_status(err: &GenieError) -> StatusCode {
    match err {
        GenieError::NoExtractableText | GenieError::Pdf(_) => StatusCode::UNPROCESSABLE_ENTITY,
        GenieError::Embedding(_) | GenieError::Chat(_) | GenieError::Http(_) => StatusCode::BAD_GATEWAY,
        GenieError::MissingCredential(_) | GenieError::Config(_) | GenieError::Index(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "error", msg.clone()),
            ApiError::NotPdf => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "error", self.to_string()),
            ApiError::Upload { status, message } => (*status, "error", message.clone()),
            ApiError::Genie(err) => {
                let kind = match err.severity() {
                    Severity::Warning => "warning",
                    Severity::Error => "error",
                };
                (genie_status(err), kind, err.user_message())
            }
        };

        let body = Json(ErrorResponse {
            status: kind.to_string(),
            error: message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_genie::Answer;

    #[test]
    fn long_sources_are_excerpted_on_char_boundaries() {
        let hit = SearchHit {
            position: 7,
            content: "ü".repeat(250),
            score: 1.5,
        };
        let source = SourceExcerpt::from(&hit);
        assert_eq!(source.chunk, 7);
        assert_eq!(source.excerpt.chars().count(), EXCERPT_CHARS + 3);
        assert!(source.excerpt.ends_with("..."));
    }

    #[test]
    fn answered_outcome_keeps_the_answer_text() {
        let outcome = Outcome::Answered(Answer {
            text: "  Alpha\n".to_string(),
            chunks_indexed: 2,
            retrieved: vec![SearchHit {
                position: 0,
                content: "Alpha Beta".to_string(),
                score: 0.0,
            }],
        });
        let response = AskResponse::from_outcome(outcome, 12);
        assert_eq!(response.status, "answered");
        assert_eq!(response.answer.as_deref(), Some("  Alpha\n"));
        assert_eq!(response.sources[0].excerpt, "Alpha Beta");
    }

    #[test]
    fn status_codes_follow_the_error_class() {
        assert_eq!(
            ApiError::from(GenieError::NoExtractableText).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(GenieError::chat("boom")).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(GenieError::MissingCredential("GOOGLE_API_KEY".into()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::NotPdf.into_response().status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
