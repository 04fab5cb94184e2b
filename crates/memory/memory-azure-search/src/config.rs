//! Azure Cognitive Search connection settings.

use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_API_VERSION: &str = "2023-11-01";
pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_CANDIDATE_MULTIPLIER: usize = 2;

/// Search service config.
///
/// | Env var | Field | Default |
/// |---------|-------|---------|
/// | `AZURE_SEARCH_ENDPOINT` | `endpoint` | required |
/// | `AZURE_SEARCH_ADMIN_KEY` | `api_key` | required |
/// | `AZURE_SEARCH_API_VERSION` | `api_version` | `2023-11-01` |
/// | `AZURE_SEARCH_PAGE_SIZE` | `page_size` | 50 |
/// | `AZURE_SEARCH_CANDIDATE_MULTIPLIER` | `candidate_multiplier` | 2 |
#[derive(Debug, Clone)]
pub struct AzureSearchConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    /// Results requested per search page.
    pub page_size: usize,
    /// Candidates fetched per requested result before threshold filtering.
    pub candidate_multiplier: usize,
}

impl AzureSearchConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            candidate_multiplier: DEFAULT_CANDIDATE_MULTIPLIER,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_candidate_multiplier(mut self, multiplier: usize) -> Self {
        self.candidate_multiplier = multiplier;
        self
    }

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
        let number = |name: &str, default: usize| -> Result<usize> {
            match var(name) {
                Some(raw) => raw
                    .trim()
                    .parse::<usize>()
                    .with_context(|| format!("{} must be a positive integer, got {:?}", name, raw)),
                None => Ok(default),
            }
        };

        let endpoint = var("AZURE_SEARCH_ENDPOINT")
            .ok_or_else(|| anyhow::anyhow!("AZURE_SEARCH_ENDPOINT is not set"))?;
        let api_key = var("AZURE_SEARCH_ADMIN_KEY")
            .ok_or_else(|| anyhow::anyhow!("AZURE_SEARCH_ADMIN_KEY is not set"))?;

        let mut config = Self::new(endpoint, api_key)
            .with_page_size(number("AZURE_SEARCH_PAGE_SIZE", DEFAULT_PAGE_SIZE)?)
            .with_candidate_multiplier(number(
                "AZURE_SEARCH_CANDIDATE_MULTIPLIER",
                DEFAULT_CANDIDATE_MULTIPLIER,
            )?);
        if let Some(version) = var("AZURE_SEARCH_API_VERSION") {
            config.api_version = version;
        }
        Ok(config)
    }

    /// Validate config.
    pub fn validate(&self) -> Result<()> {
        if reqwest::Url::parse(&self.endpoint).is_err() {
            anyhow::bail!("AZURE_SEARCH_ENDPOINT is not a valid URL: {}", self.endpoint);
        }
        if self.api_key.trim().is_empty() {
            anyhow::bail!("AZURE_SEARCH_ADMIN_KEY must not be empty");
        }
        if self.page_size == 0 {
            anyhow::bail!("AZURE_SEARCH_PAGE_SIZE must be greater than 0");
        }
        if self.candidate_multiplier == 0 {
            anyhow::bail!("AZURE_SEARCH_CANDIDATE_MULTIPLIER must be greater than 0");
        }
        Ok(())
    }
}
