//! Record-level memory store over a [`SearchBackend`].

use async_trait::async_trait;
use futures::future;
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use memory_core::{
    CollectionStream, MemoryError, MemoryQueryResult, MemoryRecord, MemoryStore,
    QueryResultStream, Result,
};
use tracing::{debug, info};

use crate::backend::{SearchBackend, SearchRequest};
use crate::client::AzureSearchClient;
use crate::config::{AzureSearchConfig, DEFAULT_CANDIDATE_MULTIPLIER};
use crate::id_codec::encode_id;
use crate::record::AzureSearchRecord;

/// Memory store that keeps records as search index documents.
///
/// Records pass through [`AzureSearchRecord`] on the way in and out, so callers only
/// ever see their own ids.
pub struct AzureSearchMemoryStore<B> {
    backend: B,
    candidate_multiplier: usize,
}

impl AzureSearchMemoryStore<AzureSearchClient> {
    /// Creates a store talking to the service described by `config`.
    pub fn from_config(config: &AzureSearchConfig) -> anyhow::Result<Self> {
        let client = AzureSearchClient::new(config)?;
        Ok(Self::new(client).with_candidate_multiplier(config.candidate_multiplier))
    }
}

impl<B: SearchBackend> AzureSearchMemoryStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            candidate_multiplier: DEFAULT_CANDIDATE_MULTIPLIER,
        }
    }

    /// Sets how many candidates are requested per wanted result. Values below 1 count as 1.
    pub fn with_candidate_multiplier(mut self, multiplier: usize) -> Self {
        self.candidate_multiplier = multiplier.max(1);
        self
    }

    fn candidate_count(&self, limit: usize) -> usize {
        limit.saturating_mul(self.candidate_multiplier).max(limit)
    }
}

/// Whether `score` clears the threshold. NaN never does.
fn passes_threshold(score: f64, min_relevance: f64) -> bool {
    score >= min_relevance
}

/// Passes items through until the first error, yields it and ends.
fn end_after_error<S, T>(inner: S) -> impl Stream<Item = Result<T>>
where
    S: Stream<Item = Result<T>> + Unpin,
{
    stream::unfold(Some(inner), |state| async move {
        let mut inner = state?;
        match inner.next().await? {
            Ok(item) => Some((Ok(item), Some(inner))),
            Err(e) => Some((Err(e), None)),
        }
    })
}

#[async_trait]
impl<B: SearchBackend> MemoryStore for AzureSearchMemoryStore<B> {
    async fn get_collections(&self) -> Result<CollectionStream> {
        self.backend.list_collections().await
    }

    async fn upsert(&self, collection: &str, record: MemoryRecord) -> Result<String> {
        let id = record.id.clone();
        let document = AzureSearchRecord::from_memory_record(&record);
        self.backend.upsert(collection, vec![document]).await?;
        Ok(id)
    }

    async fn upsert_batch(
        &self,
        collection: &str,
        records: Vec<MemoryRecord>,
    ) -> Result<Vec<String>> {
        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        let documents = records
            .iter()
            .map(AzureSearchRecord::from_memory_record)
            .collect();
        self.backend.upsert(collection, documents).await?;
        Ok(ids)
    }

    async fn get(
        &self,
        collection: &str,
        id: &str,
        with_embedding: bool,
    ) -> Result<Option<MemoryRecord>> {
        let document = self
            .backend
            .get(collection, &encode_id(id), with_embedding)
            .await?;
        Ok(document.map(|d| d.into_memory_record(with_embedding)))
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<()> {
        self.backend.delete(collection, vec![encode_id(id)]).await
    }

    async fn get_nearest_matches(
        &self,
        collection: &str,
        embedding: &[f32],
        query_text: Option<&str>,
        limit: usize,
        min_relevance: f64,
        with_embeddings: bool,
    ) -> Result<QueryResultStream> {
        if limit == 0 {
            return Err(MemoryError::InvalidArgument(
                "limit must be greater than 0".to_string(),
            ));
        }

        let request = SearchRequest {
            vector: embedding.to_vec(),
            text_hint: query_text.map(str::to_string),
            candidate_count: self.candidate_count(limit),
            include_vectors: with_embeddings,
        };
        info!(
            collection = %collection,
            limit,
            min_relevance,
            candidates = request.candidate_count,
            "step: nearest match query"
        );

        let documents = self.backend.query(collection, request).await?;
        let results = end_after_error(documents)
            .try_filter(move |scored| {
                let keep = passes_threshold(scored.score, min_relevance);
                if !keep {
                    debug!(score = scored.score, min_relevance, "step: result below threshold");
                }
                future::ready(keep)
            })
            .map_ok(move |scored| {
                MemoryQueryResult::new(
                    scored.document.into_memory_record(with_embeddings),
                    scored.score,
                )
            })
            .take(limit);

        Ok(results.boxed())
    }
}
