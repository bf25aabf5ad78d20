pub mod config;
pub mod document_processor;
pub mod embedding_service;
pub mod error;
pub mod gemini_service;
pub mod models;
pub mod providers;
pub mod query_service;
pub mod text_splitter;
pub mod vector_index;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use config::Settings;
pub use document_processor::DocumentProcessor;
pub use embedding_service::EmbeddingService;
pub use error::{GenieError, Result, Severity};
pub use gemini_service::{GeminiProvider, GeminiService};
pub use models::*;
pub use providers::{ChatModel, EmbeddingTask, Embedder, ModelProvider, Providers};
pub use query_service::QueryService;
pub use text_splitter::TextSplitter;
pub use vector_index::{DistanceMetric, VectorIndex};
