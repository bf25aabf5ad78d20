use crate::config::GeminiSettings;
use crate::error::{GenieError, Result};
use crate::models::*;
use crate::providers::{ChatModel, EmbeddingTask, Embedder, ModelProvider, Providers};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Client for the Gemini embedding and generation endpoints.
pub struct GeminiService {
    client: Client,
    api_key: String,
    api_base: String,
    embedding_model: String,
    chat_model: String,
    temperature: f32,
}

impl GeminiService {
    pub fn new(settings: &GeminiSettings, api_key: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(GenieError::MissingCredential(crate::config::CREDENTIAL_VAR.to_string()));
        }

        Ok(Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            embedding_model: model_path(&settings.embedding_model),
            chat_model: model_path(&settings.chat_model),
            temperature: settings.temperature,
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/{}:{}", self.api_base, model, method)
    }

    pub fn embed_request(&self, text: &str, task: EmbeddingTask) -> EmbedContentRequest {
        EmbedContentRequest {
            model: self.embedding_model.clone(),
            content: GeminiContent::text(text),
            task_type: match task {
                EmbeddingTask::Document => GeminiTaskType::RetrievalDocument,
                EmbeddingTask::Query => GeminiTaskType::RetrievalQuery,
            },
        }
    }

    pub fn generate_request(&self, prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent::user(prompt)],
            generation_config: Some(GeminiGenerationConfig {
                temperature: self.temperature,
            }),
        }
    }

    /// POSTs `body` and decodes the JSON reply. Non-2xx statuses become errors
    /// carrying the response body; `wrap` picks the error variant.
    async fn post_json<B, T>(&self, url: &str, body: &B, wrap: fn(String) -> GenieError) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        // The key must never appear in the URL.
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(wrap(format!("Gemini API error ({}): {}", status, error_text)));
        }

        let text = response.text().await?;
        serde_json::from_str::<T>(&text)
            .map_err(|e| wrap(format!("could not decode Gemini response: {} | {}", e, text)))
    }
}

#[async_trait]
impl Embedder for GeminiService {
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>> {
        let url = self.endpoint(&self.embedding_model, "embedContent");
        let request = self.embed_request(text, task);

        let response: EmbedContentResponse = self
            .post_json(&url, &request, GenieError::Embedding)
            .await?;

        extract_embedding(response)
    }

    fn name(&self) -> &str {
        &self.embedding_model
    }
}

#[async_trait]
impl ChatModel for GeminiService {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = self.endpoint(&self.chat_model, "generateContent");
        let request = self.generate_request(prompt);

        let response: GeminiResponse = self.post_json(&url, &request, GenieError::Chat).await?;

        extract_answer(response)
    }

    fn model(&self) -> &str {
        &self.chat_model
    }
}

/// Connects `GeminiService` for both roles.
pub struct GeminiProvider {
    settings: GeminiSettings,
}

impl GeminiProvider {
    pub fn new(settings: GeminiSettings) -> Self {
        Self { settings }
    }
}

impl ModelProvider for GeminiProvider {
    fn connect(&self, api_key: &str) -> Result<Providers> {
        let service = Arc::new(GeminiService::new(&self.settings, api_key)?);
        log::info!(
            "Connected to Gemini (embeddings: {}, chat: {})",
            service.embedding_model,
            service.chat_model
        );
        Ok(Providers {
            embedder: service.clone(),
            chat: service,
        })
    }
}

/// REST paths name models as `models/<id>`; accept either form in settings.
pub fn model_path(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("models/") {
        name.to_string()
    } else {
        format!("models/{}", name)
    }
}

fn extract_embedding(response: EmbedContentResponse) -> Result<Vec<f32>> {
    match response.embedding {
        Some(embedding) if !embedding.values.is_empty() => Ok(embedding.values),
        _ => Err(GenieError::embedding("no embedding values in response")),
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_answer(response: GeminiResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GenieError::chat("response contained no candidates"))?;

    let finish_reason = candidate.finish_reason.unwrap_or_default();
    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    if parts.is_empty() {
        return Err(GenieError::chat(format!(
            "candidate contained no text (finish reason: {})",
            if finish_reason.is_empty() { "unknown" } else { finish_reason.as_str() }
        )));
    }

    Ok(parts.into_iter().map(|p| p.text).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> GeminiService {
        GeminiService::new(&GeminiSettings::default(), "test-key").unwrap()
    }

    #[test]
    fn refuses_to_build_without_a_key() {
        let err = GeminiService::new(&GeminiSettings::default(), " ").err().unwrap();
        assert!(matches!(err, GenieError::MissingCredential(ref var) if var == "GOOGLE_API_KEY"));
    }

    #[test]
    fn model_names_get_the_models_prefix_once() {
        assert_eq!(model_path("gemini-1.5-flash"), "models/gemini-1.5-flash");
        assert_eq!(model_path("models/embedding-001"), "models/embedding-001");
    }

    #[test]
    fn endpoints_follow_the_rest_layout() {
        let svc = service();
        assert_eq!(
            svc.endpoint(&svc.chat_model, "generateContent"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(
            svc.endpoint(&svc.embedding_model, "embedContent"),
            "https://generativelanguage.googleapis.com/v1beta/models/embedding-001:embedContent"
        );
    }

    #[test]
    fn embed_request_carries_model_and_task_type() {
        let body = serde_json::to_value(service().embed_request("hello", EmbeddingTask::Document)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "models/embedding-001",
                "content": { "parts": [{ "text": "hello" }] },
                "taskType": "RETRIEVAL_DOCUMENT"
            })
        );

        let body = serde_json::to_value(service().embed_request("why?", EmbeddingTask::Query)).unwrap();
        assert_eq!(body["taskType"], "RETRIEVAL_QUERY");
    }

    #[test]
    fn generate_request_uses_configured_temperature() {
        let body = serde_json::to_value(service().generate_request("prompt text")).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "prompt text");
        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn answer_is_the_concatenated_parts_verbatim() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "  Alpha" }, { "text": " first\n" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(extract_answer(response).unwrap(), "  Alpha first\n");
    }

    #[test]
    fn blocked_or_empty_responses_are_errors() {
        let empty: GeminiResponse = serde_json::from_value(json!({ "promptFeedback": {} })).unwrap();
        assert!(matches!(extract_answer(empty), Err(GenieError::Chat(_))));

        let blocked: GeminiResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "SAFETY" }] })).unwrap();
        let err = extract_answer(blocked).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn embedding_values_are_required() {
        let ok: EmbedContentResponse =
            serde_json::from_value(json!({ "embedding": { "values": [0.1, 0.2] } })).unwrap();
        assert_eq!(extract_embedding(ok).unwrap(), vec![0.1, 0.2]);

        let missing: EmbedContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(extract_embedding(missing), Err(GenieError::Embedding(_))));
    }

    #[test]
    fn provider_hands_out_both_roles() {
        let providers = GeminiProvider::new(GeminiSettings::default()).connect("k").unwrap();
        assert_eq!(providers.chat.model(), "models/gemini-1.5-flash");
        assert_eq!(providers.embedder.name(), "models/embedding-001");
    }
}
