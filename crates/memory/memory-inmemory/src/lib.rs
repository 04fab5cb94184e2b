//! # In-Memory Search Backend
//!
//! This crate provides an in-process implementation of the `SearchBackend` trait from
//! `memory-azure-search`, so `AzureSearchMemoryStore` can run without a search service.
//!
//! ## InMemorySearchBackend
//!
//! Documents live in per-collection maps keyed by document key. Queries score every
//! document that has a vector by cosine similarity and yield them in descending order.
//!
//! **Limitations**:
//! - Data is lost on restart
//! - The text hint of a query is ignored
//! - Collections must be created before use, like indexes on the real service
//!
//! ## Example
//!
//! ```rust
//! use memory_azure_search::AzureSearchMemoryStore;
//! use memory_core::{MemoryRecord, MemoryStore};
//! use memory_inmemory::InMemorySearchBackend;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), memory_core::MemoryError> {
//!     let backend = InMemorySearchBackend::new();
//!     backend.create_collection("notes").await;
//!     let store = AzureSearchMemoryStore::new(backend);
//!
//!     let record = MemoryRecord::local("n-1", "Hello world", "", "", Some(vec![1.0, 0.0]));
//!     store.upsert("notes", record).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Thread Safety
//!
//! The backend uses `Arc<RwLock<>>` and is cheap to clone; clones share the same data.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use memory_azure_search::{
    AzureSearchRecord, NameStream, ScoredDocument, ScoredDocumentStream, SearchBackend,
    SearchRequest,
};
use memory_core::{MemoryError, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

type Collection = HashMap<String, AzureSearchRecord>;

/// In-process search backend for testing and development.
#[derive(Debug, Clone, Default)]
pub struct InMemorySearchBackend {
    collections: Arc<RwLock<BTreeMap<String, Collection>>>,
    served: Arc<AtomicUsize>,
}

impl InMemorySearchBackend {
    /// Creates a backend with no collections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty collection. Existing collections are left untouched.
    pub async fn create_collection(&self, name: &str) {
        let mut collections = self.collections.write().await;
        collections.entry(name.to_string()).or_default();
    }

    /// Drops a collection and its documents.
    pub async fn delete_collection(&self, name: &str) {
        let mut collections = self.collections.write().await;
        collections.remove(name);
    }

    /// Number of documents in `collection` (0 if it does not exist).
    pub async fn len(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map(HashMap::len).unwrap_or(0)
    }

    /// Total number of query results handed to consumers so far.
    pub fn served(&self) -> usize {
        self.served.load(Ordering::SeqCst)
    }

    /// Calculates cosine similarity between two vectors.
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

fn not_found(collection: &str) -> MemoryError {
    MemoryError::CollectionNotFound(collection.to_string())
}

fn strip_vector(mut document: AzureSearchRecord, include_vectors: bool) -> AzureSearchRecord {
    if !include_vectors {
        document.embedding.clear();
    }
    document
}

#[async_trait]
impl SearchBackend for InMemorySearchBackend {
    async fn list_collections(&self) -> Result<NameStream> {
        let collections = self.collections.read().await;
        let names: Vec<Result<String>> = collections.keys().cloned().map(Ok).collect();
        Ok(stream::iter(names).boxed())
    }

    async fn query(&self, collection: &str, request: SearchRequest) -> Result<ScoredDocumentStream> {
        let collections = self.collections.read().await;
        let documents = collections.get(collection).ok_or_else(|| not_found(collection))?;

        let mut scored: Vec<ScoredDocument> = documents
            .values()
            .filter(|d| !d.embedding.is_empty())
            .map(|d| ScoredDocument {
                score: f64::from(Self::cosine_similarity(&request.vector, &d.embedding)),
                document: strip_vector(d.clone(), request.include_vectors),
            })
            .collect();
        drop(collections);

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });
        scored.truncate(request.candidate_count);

        info!(
            collection = %collection,
            candidates = scored.len(),
            "step: in-memory vector query"
        );

        let served = self.served.clone();
        let results = stream::iter(scored).map(move |document| {
            served.fetch_add(1, Ordering::SeqCst);
            Ok(document)
        });
        Ok(results.boxed())
    }

    async fn upsert(
        &self,
        collection: &str,
        documents: Vec<AzureSearchRecord>,
    ) -> Result<Vec<String>> {
        let mut collections = self.collections.write().await;
        let stored = collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection))?;

        let mut keys = Vec::with_capacity(documents.len());
        for document in documents {
            keys.push(document.id.clone());
            match stored.get_mut(&document.id) {
                // mergeOrUpload keeps the stored vector when the update has none
                Some(existing) if document.embedding.is_empty() => {
                    let embedding = std::mem::take(&mut existing.embedding);
                    *existing = AzureSearchRecord {
                        embedding,
                        ..document
                    };
                }
                _ => {
                    stored.insert(document.id.clone(), document);
                }
            }
        }
        info!(collection = %collection, count = keys.len(), "step: in-memory upsert");
        Ok(keys)
    }

    async fn get(
        &self,
        collection: &str,
        key: &str,
        include_vectors: bool,
    ) -> Result<Option<AzureSearchRecord>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|c| c.get(key))
            .cloned()
            .map(|d| strip_vector(d, include_vectors)))
    }

    async fn delete(&self, collection: &str, keys: Vec<String>) -> Result<()> {
        let mut collections = self.collections.write().await;
        if let Some(stored) = collections.get_mut(collection) {
            for key in &keys {
                stored.remove(key);
            }
        }
        Ok(())
    }
}
