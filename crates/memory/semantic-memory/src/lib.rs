//! # Semantic Memory
//!
//! Text-level front of the memory pipeline.
//!
//! [`SemanticTextMemory`] turns query text into an embedding through an
//! [`EmbeddingService`] and hands it to a [`MemoryStore`], which filters and streams the
//! nearest records. It also embeds and saves text, either inline (`save_information`)
//! or as a pointer to an external source (`save_reference`).

use std::sync::Arc;

use embedding::EmbeddingService;
use memory_core::{
    CollectionStream, Dependency, MemoryError, MemoryRecord, MemoryStore, QueryResultStream,
    Result,
};
use tracing::{error, info};

/// Semantic memory over a store and an embedding provider.
pub struct SemanticTextMemory {
    store: Arc<dyn MemoryStore>,
    embedding_service: Arc<dyn EmbeddingService>,
}

impl SemanticTextMemory {
    /// Creates a new SemanticTextMemory.
    ///
    /// # Arguments
    ///
    /// * `store` - Record store searched and written to (e.g. Azure Cognitive Search).
    /// * `embedding_service` - Service that turns text into vectors (e.g. Azure OpenAI).
    pub fn new(store: Arc<dyn MemoryStore>, embedding_service: Arc<dyn EmbeddingService>) -> Self {
        Self {
            store,
            embedding_service,
        }
    }

    /// Lists the collections of the underlying store.
    pub async fn get_collections(&self) -> Result<CollectionStream> {
        self.store.get_collections().await
    }

    /// Searches `collection` for records semantically close to `query`.
    ///
    /// 1. Rejects `limit == 0` before anything else is called.
    /// 2. Embeds the query text.
    /// 3. Asks the store for up to `limit` matches with relevance >= `min_relevance`,
    ///    passing the query text along as a keyword hint.
    ///
    /// Results are produced lazily; dropping the stream stops any remaining work.
    pub async fn search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
        min_relevance: f64,
        with_embeddings: bool,
    ) -> Result<QueryResultStream> {
        if limit == 0 {
            return Err(MemoryError::InvalidArgument(
                "limit must be greater than 0".to_string(),
            ));
        }

        info!(collection = %collection, limit, min_relevance, "step: semantic search");
        let embedding = self.embed(query).await?;

        self.store
            .get_nearest_matches(
                collection,
                &embedding,
                Some(query),
                limit,
                min_relevance,
                with_embeddings,
            )
            .await
    }

    /// Embeds `text` and saves it inline under `id`. Returns the id.
    pub async fn save_information(
        &self,
        collection: &str,
        text: &str,
        id: &str,
        description: &str,
        additional_metadata: &str,
    ) -> Result<String> {
        let embedding = self.embed(text).await?;
        let record = MemoryRecord::local(id, text, description, additional_metadata, Some(embedding));
        let saved = self.store.upsert(collection, record).await?;
        info!(collection = %collection, id = %saved, "step: information saved");
        Ok(saved)
    }

    /// Embeds `text` and saves a reference to it under `external_id`; the text itself
    /// is not stored. Returns the id.
    pub async fn save_reference(
        &self,
        collection: &str,
        text: &str,
        external_id: &str,
        external_source_name: &str,
        description: &str,
        additional_metadata: &str,
    ) -> Result<String> {
        let embedding = self.embed(text).await?;
        let record = MemoryRecord::reference(
            external_id,
            external_source_name,
            description,
            additional_metadata,
            Some(embedding),
        );
        let saved = self.store.upsert(collection, record).await?;
        info!(
            collection = %collection,
            id = %saved,
            source = %external_source_name,
            "step: reference saved"
        );
        Ok(saved)
    }

    /// Fetches a record by id.
    pub async fn get(
        &self,
        collection: &str,
        key: &str,
        with_embedding: bool,
    ) -> Result<Option<MemoryRecord>> {
        self.store.get(collection, key, with_embedding).await
    }

    /// Removes a record by id.
    pub async fn remove(&self, collection: &str, key: &str) -> Result<()> {
        self.store.remove(collection, key).await
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embedding_service.embed(text).await.map_err(|e| {
            error!(error = %e, "step: embedding failed");
            MemoryError::dependency(Dependency::Embedding, e)
        })
    }
}
