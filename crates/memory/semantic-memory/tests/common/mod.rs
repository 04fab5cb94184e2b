//! Shared test utilities for semantic-memory integration tests.
//!
//! Provides MockEmbeddingService (fixed vectors per text, call counting),
//! FailingEmbeddingService and a store backed by the in-memory search backend.

use async_trait::async_trait;
use embedding::EmbeddingService;
use memory_azure_search::AzureSearchMemoryStore;
use memory_core::MemoryStore;
use memory_inmemory::InMemorySearchBackend;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock embedding service: returns the vector registered for a text, or a fallback.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockEmbeddingService {
    vectors: HashMap<String, Vec<f32>>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockEmbeddingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        self.vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![0.0, 0.0, 1.0])
    }
}

#[async_trait]
impl EmbeddingService for MockEmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vector_for(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }
}

/// Embedding service whose every call fails.
#[allow(dead_code)]
pub struct FailingEmbeddingService;

#[async_trait]
impl EmbeddingService for FailingEmbeddingService {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, anyhow::Error> {
        Err(anyhow::anyhow!("embedding quota exceeded"))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        Err(anyhow::anyhow!("embedding quota exceeded"))
    }
}

/// Creates an in-memory backend with the given collections and a store over it.
#[allow(dead_code)]
pub async fn store_with(collections: &[&str]) -> (InMemorySearchBackend, Arc<dyn MemoryStore>) {
    let backend = InMemorySearchBackend::new();
    for name in collections {
        backend.create_collection(name).await;
    }
    let store: Arc<dyn MemoryStore> = Arc::new(AzureSearchMemoryStore::new(backend.clone()));
    (backend, store)
}
