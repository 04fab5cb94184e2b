//! Azure Cognitive Search REST client.
//!
//! Implements [`SearchBackend`] over the service's data plane API:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list_collections | `GET /indexes?$select=name` |
//! | query | `POST /indexes/{collection}/docs/search` (paged with `top` / `skip`) |
//! | upsert | `POST /indexes/{collection}/docs/index` with `mergeOrUpload` actions |
//! | delete | `POST /indexes/{collection}/docs/index` with `delete` actions |
//! | get | `GET /indexes/{collection}/docs/{key}` |
//!
//! Every request carries the `api-key` header and the `api-version` query parameter.

use anyhow::Context;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use memory_core::{Dependency, MemoryError, Result};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info};

use crate::backend::{NameStream, ScoredDocument, ScoredDocumentStream, SearchBackend, SearchRequest};
use crate::config::AzureSearchConfig;
use crate::fields;
use crate::record::AzureSearchRecord;

const ACTION_KEY: &str = "@search.action";

#[derive(Debug, Deserialize)]
struct IndexList {
    value: Vec<IndexName>,
}

#[derive(Debug, Deserialize)]
struct IndexName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    value: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct IndexBatchResponse {
    #[serde(default)]
    value: Vec<IndexingResult>,
}

#[derive(Debug, Deserialize)]
struct IndexingResult {
    key: String,
    status: bool,
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
    #[serde(rename = "statusCode")]
    status_code: Option<u16>,
}

/// REST client for one search service.
#[derive(Debug, Clone)]
pub struct AzureSearchClient {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    page_size: usize,
}

impl AzureSearchClient {
    /// Creates a client after validating `config`.
    pub fn new(config: &AzureSearchConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a client on top of an existing `reqwest::Client`.
    pub fn with_client(client: Client, config: &AzureSearchConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            page_size: config.page_size.max(1),
        }
    }

    /// Builds `{endpoint}/{segments...}?api-version=...`, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| {
            MemoryError::InvalidArgument(format!("invalid endpoint {:?}: {}", self.endpoint, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                MemoryError::InvalidArgument(format!(
                    "endpoint {:?} cannot be used as a base URL",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        request
            .header("api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "step: search request failed");
                MemoryError::dependency(Dependency::SearchBackend, e)
            })
    }

    async fn fetch_page(
        &self,
        collection: &str,
        request: &SearchRequest,
        skip: usize,
        top: usize,
    ) -> Result<Vec<ScoredDocument>> {
        let url = self.url(&["indexes", collection, "docs", "search"])?;
        let body = json!({
            "search": request.text_hint,
            "vectorQueries": [{
                "kind": "vector",
                "vector": request.vector,
                "fields": fields::EMBEDDING,
                "k": request.candidate_count,
            }],
            "select": fields::select_list(request.include_vectors),
            "top": top,
            "skip": skip,
        });

        debug!(collection = %collection, skip, top, "step: fetching search page");
        let response = self.send(self.client.post(url).json(&body)).await?;
        let response = check_status(response, Some(collection)).await?;
        let page: SearchPage = parse_body(response).await?;

        let mut documents = Vec::with_capacity(page.value.len());
        for item in page.value.iter().take(top) {
            let score = item
                .get(fields::SCORE_ANNOTATION)
                .and_then(Value::as_f64)
                .ok_or_else(|| {
                    MemoryError::Serialization(format!(
                        "search result has no numeric {:?}",
                        fields::SCORE_ANNOTATION
                    ))
                })?;
            documents.push(ScoredDocument {
                document: AzureSearchRecord::from_json(item)?,
                score,
            });
        }
        debug!(collection = %collection, count = documents.len(), "step: search page received");
        Ok(documents)
    }

    async fn index_batch(&self, collection: &str, actions: Vec<Value>) -> Result<()> {
        let url = self.url(&["indexes", collection, "docs", "index"])?;
        let response = self
            .send(self.client.post(url).json(&json!({ "value": actions })))
            .await?;
        let response = check_status(response, Some(collection)).await?;
        let batch: IndexBatchResponse = parse_body(response).await?;

        if let Some(failed) = batch.value.iter().find(|r| !r.status) {
            let message = format!(
                "indexing key {:?} failed ({}): {}",
                failed.key,
                failed
                    .status_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "no status".to_string()),
                failed.error_message.as_deref().unwrap_or("no error message")
            );
            error!(collection = %collection, key = %failed.key, "step: indexing action failed");
            return Err(MemoryError::dependency(Dependency::SearchBackend, message));
        }
        Ok(())
    }
}

/// Maps non-success responses: 404 is a missing collection when `collection` is given,
/// anything else a backend failure carrying status and body.
async fn check_status(response: Response, collection: Option<&str>) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        if let Some(name) = collection {
            info!(collection = %name, "step: collection not found");
            return Err(MemoryError::CollectionNotFound(name.to_string()));
        }
    }
    let body = response.text().await.unwrap_or_default();
    error!(status = %status, body = %body, "step: search service returned an error");
    Err(MemoryError::dependency(
        Dependency::SearchBackend,
        format!("Azure Search API error ({}): {}", status, body),
    ))
}

async fn parse_body<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let text = response
        .text()
        .await
        .map_err(|e| MemoryError::dependency(Dependency::SearchBackend, e))?;
    serde_json::from_str(&text)
        .map_err(|e| MemoryError::Serialization(format!("unexpected response body: {}", e)))
}

fn with_action(action: &str, mut document: Map<String, Value>) -> Value {
    document.insert(ACTION_KEY.to_string(), Value::from(action));
    Value::Object(document)
}

/// Pages through search results as the consumer polls.
struct Pager {
    client: AzureSearchClient,
    collection: String,
    request: SearchRequest,
    buffer: std::vec::IntoIter<ScoredDocument>,
    fetched: usize,
    exhausted: bool,
}

impl Pager {
    fn next_top(&self) -> usize {
        self.client
            .page_size
            .min(self.request.candidate_count - self.fetched)
    }

    fn accept(&mut self, page: Vec<ScoredDocument>, top: usize) {
        self.fetched += page.len();
        self.exhausted = page.len() < top || self.fetched >= self.request.candidate_count;
        self.buffer = page.into_iter();
    }

    async fn next(mut self) -> Result<Option<(ScoredDocument, Self)>> {
        loop {
            if let Some(document) = self.buffer.next() {
                return Ok(Some((document, self)));
            }
            if self.exhausted {
                return Ok(None);
            }
            let top = self.next_top();
            let page = self
                .client
                .fetch_page(&self.collection, &self.request, self.fetched, top)
                .await?;
            self.accept(page, top);
        }
    }
}

#[async_trait]
impl SearchBackend for AzureSearchClient {
    async fn list_collections(&self) -> Result<NameStream> {
        let mut url = self.url(&["indexes"])?;
        url.query_pairs_mut().append_pair("$select", "name");

        let response = self.send(self.client.get(url)).await?;
        let response = check_status(response, None).await?;
        let list: IndexList = parse_body(response).await?;

        info!(count = list.value.len(), "step: collections listed");
        let names: Vec<Result<String>> = list.value.into_iter().map(|i| Ok(i.name)).collect();
        Ok(stream::iter(names).boxed())
    }

    async fn query(&self, collection: &str, request: SearchRequest) -> Result<ScoredDocumentStream> {
        if request.candidate_count == 0 {
            return Ok(stream::empty().boxed());
        }

        let mut pager = Pager {
            client: self.clone(),
            collection: collection.to_string(),
            request,
            buffer: Vec::new().into_iter(),
            fetched: 0,
            exhausted: false,
        };
        // The first page is fetched here so a missing collection fails the call itself.
        let top = pager.next_top();
        let first = self
            .fetch_page(collection, &pager.request, 0, top)
            .await?;
        pager.accept(first, top);

        Ok(stream::try_unfold(pager, Pager::next).boxed())
    }

    async fn upsert(
        &self,
        collection: &str,
        documents: Vec<AzureSearchRecord>,
    ) -> Result<Vec<String>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        let keys: Vec<String> = documents.iter().map(|d| d.id.clone()).collect();
        let actions = documents
            .iter()
            .map(|d| with_action("mergeOrUpload", d.to_json()))
            .collect();

        self.index_batch(collection, actions).await?;
        info!(collection = %collection, count = keys.len(), "step: documents upserted");
        Ok(keys)
    }

    async fn get(
        &self,
        collection: &str,
        key: &str,
        include_vectors: bool,
    ) -> Result<Option<AzureSearchRecord>> {
        let mut url = self.url(&["indexes", collection, "docs", key])?;
        url.query_pairs_mut()
            .append_pair("$select", &fields::select_list(include_vectors));

        let response = self.send(self.client.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(collection = %collection, key = %key, "step: document not found");
            return Ok(None);
        }
        let response = check_status(response, None).await?;
        let value: Value = parse_body(response).await?;
        AzureSearchRecord::from_json(&value).map(Some)
    }

    async fn delete(&self, collection: &str, keys: Vec<String>) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let count = keys.len();
        let actions = keys
            .into_iter()
            .map(|key| {
                let mut document = Map::new();
                document.insert(fields::ID.to_string(), Value::from(key));
                with_action("delete", document)
            })
            .collect();

        self.index_batch(collection, actions).await?;
        info!(collection = %collection, count, "step: documents deleted");
        Ok(())
    }
}
