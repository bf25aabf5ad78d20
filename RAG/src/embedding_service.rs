use crate::error::Result;
use crate::providers::{EmbeddingTask, Embedder};
use crate::vector_index::{DistanceMetric, VectorIndex};
use std::sync::Arc;

pub struct EmbeddingService {
    embedder: Arc<dyn Embedder>,
    metric: DistanceMetric,
}

impl EmbeddingService {
    pub fn new(embedder: Arc<dyn Embedder>, metric: DistanceMetric) -> Self {
        Self { embedder, metric }
    }

    /// Embeds every chunk, one request each and in order, into a fresh index.
    /// The first failure aborts the build.
    pub async fn build_index(&self, chunks: Vec<String>) -> Result<VectorIndex> {
        log::info!(
            "Generating embeddings for {} chunks with {}...",
            chunks.len(),
            self.embedder.name()
        );

        let mut index = VectorIndex::new(self.metric);
        for (position, chunk) in chunks.into_iter().enumerate() {
            let vector = self.embedder.embed(&chunk, EmbeddingTask::Document).await?;
            log::debug!("Embedded chunk {} ({} dimensions)", position, vector.len());
            index.insert(chunk, vector)?;
        }

        log::info!(
            "Built {} index over {} chunks ({} dimensions)",
            index.metric(),
            index.len(),
            index.dimension().unwrap_or(0)
        );
        Ok(index)
    }

    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.embedder.embed(query, EmbeddingTask::Query).await
    }
}
