//! Test support: real PDF fixtures and in-process model providers.
//!
//! Compiled for this crate's tests and for other crates through the
//! `test-util` feature.

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{GenieError, Result};
use crate::providers::{ChatModel, EmbeddingTask, Embedder, ModelProvider, Providers};

/// Builds a PDF with one page per entry, each page drawing its text with a
/// single `Tj`. An empty entry gives a page with no text at all.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for text in pages {
        let operations = if text.is_empty() {
            Vec::new()
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), Object::Integer(12)]),
                Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode page content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        });
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(pages.len() as i64),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize test PDF");
    bytes
}

/// Deterministic embedder and chat model that records how it was used.
///
/// Embeddings are letter histograms plus a constant component, so texts that
/// share letters land close together and no vector is all zeros.
pub struct MockBackend {
    answer: String,
    embedding_error: Option<String>,
    chat_error: Option<String>,
    document_embeds: AtomicUsize,
    query_embeds: AtomicUsize,
    chat_calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            embedding_error: None,
            chat_error: None,
            document_embeds: AtomicUsize::new(0),
            query_embeds: AtomicUsize::new(0),
            chat_calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_embeddings(mut self, message: impl Into<String>) -> Self {
        self.embedding_error = Some(message.into());
        self
    }

    pub fn failing_chat(mut self, message: impl Into<String>) -> Self {
        self.chat_error = Some(message.into());
        self
    }

    pub fn document_embeds(&self) -> usize {
        self.document_embeds.load(Ordering::SeqCst)
    }

    pub fn query_embeds(&self) -> usize {
        self.query_embeds.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn api_calls(&self) -> usize {
        self.document_embeds() + self.query_embeds() + self.chat_calls()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log poisoned").clone()
    }
}

pub fn letter_histogram(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; 27];
    vector[26] = 1.0;
    for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
        let slot = (c.to_ascii_lowercase() as u8 - b'a') as usize;
        vector[slot] += 1.0;
    }
    vector
}

#[async_trait]
impl Embedder for MockBackend {
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>> {
        match task {
            EmbeddingTask::Document => self.document_embeds.fetch_add(1, Ordering::SeqCst),
            EmbeddingTask::Query => self.query_embeds.fetch_add(1, Ordering::SeqCst),
        };
        if let Some(message) = &self.embedding_error {
            return Err(GenieError::embedding(message.clone()));
        }
        Ok(letter_histogram(text))
    }

    fn name(&self) -> &str {
        "mock-embedder"
    }
}

#[async_trait]
impl ChatModel for MockBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.to_string());
        if let Some(message) = &self.chat_error {
            return Err(GenieError::chat(message.clone()));
        }
        Ok(self.answer.clone())
    }

    fn model(&self) -> &str {
        "mock-chat"
    }
}

/// Hands out a shared `MockBackend` and counts connections.
pub struct MockProvider {
    backend: Arc<MockBackend>,
    connects: AtomicUsize,
    keys: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(backend: MockBackend) -> Self {
        Self {
            backend: Arc::new(backend),
            connects: AtomicUsize::new(0),
            keys: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(answer: impl Into<String>) -> Self {
        Self::new(MockBackend::answering(answer))
    }

    pub fn backend(&self) -> &MockBackend {
        &self.backend
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().expect("key log poisoned").clone()
    }
}

impl ModelProvider for MockProvider {
    fn connect(&self, api_key: &str) -> Result<Providers> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.keys
            .lock()
            .expect("key log poisoned")
            .push(api_key.to_string());
        Ok(Providers {
            embedder: self.backend.clone(),
            chat: self.backend.clone(),
        })
    }
}
