//! # Azure OpenAI Embedding Service
//!
//! This crate provides an implementation of the `EmbeddingService` trait using an
//! Azure OpenAI embedding deployment (e.g. `text-embedding-ada-002`).
//!
//! ## Example
//!
//! ```rust,no_run
//! use azure_openai_embedding::AzureOpenAIEmbedding;
//! use embedding::{EmbeddingConfig, EmbeddingService};
//!
//! async fn example() -> Result<(), anyhow::Error> {
//!     let config = EmbeddingConfig::from_env()?;
//!     let service = AzureOpenAIEmbedding::from_config(&config)?;
//!     let embedding = service.embed("Hello world").await?;
//!     println!("Embedding dimension: {}", embedding.len());
//!     Ok(())
//! }
//! ```
//!
//! ## External Interactions
//!
//! - **Azure OpenAI**: `POST {endpoint}/openai/deployments/{deployment}/embeddings?api-version=...`
//!   authenticated with the `api-key` header.
//! - Requests are not retried here; retry policy belongs to the caller.

use async_trait::async_trait;
use embedding::{EmbeddingConfig, EmbeddingService};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Azure OpenAI embedding service implementation.
#[derive(Debug, Clone)]
pub struct AzureOpenAIEmbedding {
    client: Client,
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
}

impl AzureOpenAIEmbedding {
    /// Creates a new Azure OpenAI embedding service.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Resource endpoint, e.g. `https://my-resource.openai.azure.com`.
    /// * `api_key` - Resource key sent as the `api-key` header.
    /// * `deployment` - Name of the embedding model deployment.
    /// * `api_version` - REST API version, e.g. `2023-05-15`.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Result<Self, anyhow::Error> {
        let client = Client::builder()
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
        let endpoint: String = endpoint.into();

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            deployment: deployment.into(),
            api_version: api_version.into(),
        })
    }

    /// Creates the service from an [`EmbeddingConfig`].
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, anyhow::Error> {
        config.validate()?;
        Self::new(
            config.endpoint.clone(),
            config.api_key.clone(),
            config.deployment.clone(),
            config.api_version.clone(),
        )
    }

    /// Returns the deployment name.
    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    fn embeddings_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }

    async fn request(&self, input: Input<'_>) -> Result<Vec<EmbeddingData>, anyhow::Error> {
        let request = EmbeddingRequest { input };

        let response = self
            .client
            .post(self.embeddings_url())
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, deployment = %self.deployment, "Azure OpenAI embed request failed");
                anyhow::anyhow!("Azure OpenAI embed request failed: {}", e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, deployment = %self.deployment, "Azure OpenAI API error");
            return Err(anyhow::anyhow!("Azure OpenAI API error ({}): {}", status, error_text));
        }

        let embedding_response: EmbeddingResponse = response.json().await?;
        debug!(count = embedding_response.data.len(), "Azure OpenAI embed response received");

        let mut data = embedding_response.data;
        data.sort_by_key(|d| d.index);
        Ok(data)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: Input<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Input<'a> {
    Single(&'a str),
    Batch(&'a [&'a str]),
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[async_trait]
impl EmbeddingService for AzureOpenAIEmbedding {
    /// Generates an embedding vector for a single text string.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the service answers with a non-success
    /// status (bad key, unknown deployment, throttling) or the response has no embedding.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        info!(
            deployment = %self.deployment,
            text_len = text.len(),
            "step: embedding Azure OpenAI embed request"
        );

        let data = self.request(Input::Single(text)).await?;
        let embedding = data
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No embedding in response"))?
            .embedding;

        info!(dimension = embedding.len(), "step: embedding Azure OpenAI embed done");
        Ok(embedding)
    }

    /// Generates embedding vectors for multiple texts in a single API call.
    ///
    /// An empty input returns an empty result without calling the service.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        if texts.is_empty() {
            debug!("Azure OpenAI embed_batch empty input, skipping");
            return Ok(vec![]);
        }

        info!(
            deployment = %self.deployment,
            batch_size = texts.len(),
            "step: embedding Azure OpenAI embed_batch request"
        );

        let inputs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        let embeddings: Vec<Vec<f32>> = self
            .request(Input::Batch(&inputs))
            .await?
            .into_iter()
            .map(|item| item.embedding)
            .collect();

        if embeddings.len() != texts.len() {
            warn!(
                expected = texts.len(),
                got = embeddings.len(),
                "Azure OpenAI embed_batch response count mismatch"
            );
            return Err(anyhow::anyhow!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            ));
        }

        info!(
            count = embeddings.len(),
            dimension = embeddings.first().map(|v| v.len()).unwrap_or(0),
            "step: embedding Azure OpenAI embed_batch done"
        );
        Ok(embeddings)
    }
}
