//! Seams between the pipeline and the hosted model services.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;

/// What an embedding will be used for. Some services embed documents and
/// queries differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingTask {
    Document,
    Query,
}

/// Turns text into a vector. One call is one remote request.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Sends a fully assembled prompt to a chat model and returns its text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    fn model(&self) -> &str;
}

/// The model clients for one run.
#[derive(Clone)]
pub struct Providers {
    pub embedder: Arc<dyn Embedder>,
    pub chat: Arc<dyn ChatModel>,
}

/// Builds model clients once a credential has been resolved. Nothing talks
/// to the network before `connect` is called.
pub trait ModelProvider: Send + Sync {
    fn connect(&self, api_key: &str) -> Result<Providers>;
}
