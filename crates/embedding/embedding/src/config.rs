//! Embedding configuration loaded from environment variables.

use anyhow::Result;
use std::env;

pub const DEFAULT_DEPLOYMENT: &str = "text-embedding-ada-002";
pub const DEFAULT_API_VERSION: &str = "2023-05-15";

/// Azure OpenAI embedding config.
///
/// | Env var | Field | Default |
/// |---------|-------|---------|
/// | `AZURE_OPENAI_ENDPOINT` | `endpoint` | required |
/// | `AZURE_OPENAI_KEY` | `api_key` | required |
/// | `AZURE_OPENAI_EMBEDDING_DEPLOYMENT` | `deployment` | `text-embedding-ada-002` |
/// | `AZURE_OPENAI_API_VERSION` | `api_version` | `2023-05-15` |
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

impl EmbeddingConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|s| !s.trim().is_empty());

        let endpoint = var("AZURE_OPENAI_ENDPOINT")
            .ok_or_else(|| anyhow::anyhow!("AZURE_OPENAI_ENDPOINT is not set"))?;
        let api_key = var("AZURE_OPENAI_KEY")
            .ok_or_else(|| anyhow::anyhow!("AZURE_OPENAI_KEY is not set"))?;
        let deployment = var("AZURE_OPENAI_EMBEDDING_DEPLOYMENT")
            .unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string());
        let api_version =
            var("AZURE_OPENAI_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            deployment,
            api_version,
        })
    }

    /// Validate config (endpoint must be an absolute URL).
    pub fn validate(&self) -> Result<()> {
        if reqwest::Url::parse(&self.endpoint).is_err() {
            anyhow::bail!("AZURE_OPENAI_ENDPOINT is not a valid URL: {}", self.endpoint);
        }
        if self.deployment.contains('/') {
            anyhow::bail!(
                "AZURE_OPENAI_EMBEDDING_DEPLOYMENT must be a deployment name, got: {}",
                self.deployment
            );
        }
        Ok(())
    }
}
