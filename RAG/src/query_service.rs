use crate::config::{Settings, CREDENTIAL_VAR};
use crate::document_processor::DocumentProcessor;
use crate::embedding_service::EmbeddingService;
use crate::error::{GenieError, Result};
use crate::models::*;
use crate::providers::ModelProvider;
use std::sync::Arc;

const PROMPT_TEMPLATE: &str = "You are a helpful assistant. Answer the user's question based only on the context provided.
If you don't know the answer, just say that you don't know.

Context: {context}
Question: {question}
";

/// Runs the whole pipeline for one interaction. Nothing is kept between calls.
pub struct QueryService {
    settings: Arc<Settings>,
    processor: DocumentProcessor,
    provider: Arc<dyn ModelProvider>,
}

impl QueryService {
    pub fn new(settings: Arc<Settings>, provider: Arc<dyn ModelProvider>) -> Result<Self> {
        settings.validate()?;
        let processor = DocumentProcessor::new(&settings.chunking)?;
        Ok(Self {
            settings,
            processor,
            provider,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Extract, chunk, embed and index `pdf`; then, if `question` has any
    /// non-whitespace content, retrieve context and ask the chat model.
    ///
    /// Halts with `NoExtractableText` before the credential is looked at, and
    /// with `MissingCredential` before any provider is connected.
    pub async fn process(&self, pdf: Vec<u8>, question: Option<&str>) -> Result<Outcome> {
        let text = self.processor.extract_text(pdf).await?;
        let chunks = self.processor.create_chunks(&text);

        let api_key = self
            .settings
            .gemini
            .api_key
            .as_deref()
            .ok_or_else(|| GenieError::MissingCredential(CREDENTIAL_VAR.to_string()))?;
        let providers = self.provider.connect(api_key)?;

        let embeddings = EmbeddingService::new(providers.embedder, self.settings.retrieval.metric);
        let index = embeddings.build_index(chunks).await?;
        let chunks_indexed = index.len();

        let question = match question.filter(|q| !q.trim().is_empty()) {
            Some(question) => question,
            None => {
                log::info!("No question yet; indexed {} chunks", chunks_indexed);
                return Ok(Outcome::Indexed {
                    chunks: chunks_indexed,
                });
            }
        };

        let query_embedding = embeddings.embed_query(question).await?;
        let retrieved = index.search(&query_embedding, self.settings.retrieval.top_k)?;
        log::info!("Retrieved {} of {} chunks", retrieved.len(), chunks_indexed);

        let prompt = build_prompt(&build_context(&retrieved), question);
        log::debug!("Prompt is {} characters", prompt.chars().count());

        let text = providers.chat.complete(&prompt).await?;
        log::info!("Answer generated by {}", providers.chat.model());

        Ok(Outcome::Answered(Answer {
            text,
            chunks_indexed,
            retrieved,
        }))
    }
}

/// Retrieved chunk texts separated by a blank line.
pub fn build_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| hit.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(context: &str, question: &str) -> String {
    // Question first, so a literal "{question}" in the document text survives.
    PROMPT_TEMPLATE
        .replacen("{question}", question, 1)
        .replacen("{context}", context, 1)
}
