//! # Text Embeddings
//!
//! This crate defines the embedding service interface used to vectorize memory text
//! and search queries, plus the configuration shared by embedding providers.

use async_trait::async_trait;

mod config;
pub use config::EmbeddingConfig;

/// Service for generating text embeddings.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Generates an embedding vector for a single text string.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error>;

    /// Generates embedding vectors for multiple texts in a single API call,
    /// in the same order as `texts`.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error>;
}
