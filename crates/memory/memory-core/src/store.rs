//! # Memory Storage
//!
//! This module defines the record-level storage interface for semantic memory.
//!
//! The `MemoryStore` trait is implemented by storage backends (Azure Cognitive Search, etc.).
//! Reads that may return many items hand back a stream that the caller drives; dropping
//! the stream abandons the remaining work.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::types::{MemoryQueryResult, MemoryRecord};

/// Lazily produced collection names.
pub type CollectionStream = BoxStream<'static, Result<String>>;

/// Lazily produced search results, in descending relevance order.
pub type QueryResultStream = BoxStream<'static, Result<MemoryQueryResult>>;

/// Trait for storing, retrieving and searching memory records grouped in collections.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Lists the collections known to the backend at call time.
    async fn get_collections(&self) -> Result<CollectionStream>;

    /// Inserts or replaces a record. Returns the caller's id.
    async fn upsert(&self, collection: &str, record: MemoryRecord) -> Result<String>;

    /// Inserts or replaces several records in one request. Returns the ids written.
    async fn upsert_batch(&self, collection: &str, records: Vec<MemoryRecord>)
        -> Result<Vec<String>>;

    /// Fetches a record by its id. Returns `None` if not found.
    async fn get(&self, collection: &str, id: &str, with_embedding: bool)
        -> Result<Option<MemoryRecord>>;

    /// Deletes a record by its id.
    async fn remove(&self, collection: &str, id: &str) -> Result<()>;

    /// Searches a collection with a query embedding.
    ///
    /// Yields at most `limit` results with relevance >= `min_relevance`, in the order
    /// the backend ranks them. `query_text`, when given, is passed along as a text hint
    /// for hybrid ranking. Fails with `CollectionNotFound` when the collection is missing.
    async fn get_nearest_matches(
        &self,
        collection: &str,
        embedding: &[f32],
        query_text: Option<&str>,
        limit: usize,
        min_relevance: f64,
        with_embeddings: bool,
    ) -> Result<QueryResultStream>;
}
