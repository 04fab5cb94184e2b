//! Backend search capability over index documents.
//!
//! [`SearchBackend`] is the seam between the record-level [`AzureSearchMemoryStore`]
//! and whatever holds the documents: the REST client in [`crate::client`] or an
//! in-process implementation for tests.
//!
//! [`AzureSearchMemoryStore`]: crate::store::AzureSearchMemoryStore

use async_trait::async_trait;
use futures::stream::BoxStream;
use memory_core::Result;

use crate::record::AzureSearchRecord;

/// A vector query against one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Query embedding.
    pub vector: Vec<f32>,
    /// Optional keyword text for hybrid ranking.
    pub text_hint: Option<String>,
    /// Upper bound on the number of documents the backend should produce.
    pub candidate_count: usize,
    /// Whether documents should carry their stored vector.
    pub include_vectors: bool,
}

/// A document together with the relevance score assigned by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: AzureSearchRecord,
    pub score: f64,
}

pub type NameStream = BoxStream<'static, Result<String>>;
pub type ScoredDocumentStream = BoxStream<'static, Result<ScoredDocument>>;

/// Document-level operations a search index provides.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Lists collection (index) names.
    async fn list_collections(&self) -> Result<NameStream>;

    /// Runs a vector query, producing documents in descending score order.
    ///
    /// Fails with `CollectionNotFound` before returning if the collection does not
    /// exist. Later failures are yielded on the stream.
    async fn query(&self, collection: &str, request: SearchRequest)
        -> Result<ScoredDocumentStream>;

    /// Inserts or merges documents. Returns the keys written.
    async fn upsert(&self, collection: &str, documents: Vec<AzureSearchRecord>)
        -> Result<Vec<String>>;

    /// Fetches a document by key.
    async fn get(
        &self,
        collection: &str,
        key: &str,
        include_vectors: bool,
    ) -> Result<Option<AzureSearchRecord>>;

    /// Deletes documents by key. Missing keys are not an error.
    async fn delete(&self, collection: &str, keys: Vec<String>) -> Result<()>;
}
