//! Shared test utilities for memory-azure-search integration tests.
//!
//! Provides ScriptedBackend, a SearchBackend that serves fixed scored documents and
//! records what the store asked for.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use memory_azure_search::{
    AzureSearchRecord, NameStream, ScoredDocument, ScoredDocumentStream, SearchBackend,
    SearchRequest,
};
use memory_core::{Dependency, MemoryError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted query outcome item.
#[allow(dead_code)]
pub enum Scripted {
    Document(ScoredDocument),
    Failure(&'static str),
}

/// Backend serving scripted query results per collection.
///
/// `pulled` counts the items the consumer has taken from query streams.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    collections: Arc<Mutex<HashMap<String, Vec<Arc<Scripted>>>>>,
    documents: Arc<Mutex<HashMap<String, HashMap<String, AzureSearchRecord>>>>,
    pub requests: Arc<Mutex<Vec<SearchRequest>>>,
    pub pulled: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(self, name: &str, items: Vec<Scripted>) -> Self {
        self.collections
            .lock()
            .unwrap()
            .insert(name.to_string(), items.into_iter().map(Arc::new).collect());
        self
    }

    pub fn stored(&self, collection: &str) -> HashMap<String, AzureSearchRecord> {
        self.documents
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn last_request(&self) -> Option<SearchRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }

    fn require(&self, collection: &str) -> Result<()> {
        if self.collections.lock().unwrap().contains_key(collection) {
            Ok(())
        } else {
            Err(MemoryError::CollectionNotFound(collection.to_string()))
        }
    }
}

/// Builds a scored document with the given plain key and score.
#[allow(dead_code)]
pub fn scored(key: &str, text: &str, score: f64) -> Scripted {
    Scripted::Document(ScoredDocument {
        document: AzureSearchRecord {
            id: memory_azure_search::encode_id(key),
            text: text.to_string(),
            embedding: vec![0.5, 0.5],
            ..AzureSearchRecord::default()
        },
        score,
    })
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn list_collections(&self) -> Result<NameStream> {
        let mut names: Vec<String> = self.collections.lock().unwrap().keys().cloned().collect();
        names.sort();
        Ok(stream::iter(names.into_iter().map(Ok)).boxed())
    }

    async fn query(&self, collection: &str, request: SearchRequest) -> Result<ScoredDocumentStream> {
        self.require(collection)?;
        self.requests.lock().unwrap().push(request.clone());

        let items: Vec<Arc<Scripted>> = self.collections.lock().unwrap()[collection]
            .iter()
            .take(request.candidate_count)
            .cloned()
            .collect();
        let pulled = self.pulled.clone();
        let include_vectors = request.include_vectors;

        let stream = stream::iter(items).map(move |item| {
            pulled.fetch_add(1, Ordering::SeqCst);
            match item.as_ref() {
                Scripted::Document(scored) => {
                    let mut scored = scored.clone();
                    if !include_vectors {
                        scored.document.embedding.clear();
                    }
                    Ok(scored)
                }
                Scripted::Failure(message) => Err(MemoryError::dependency(
                    Dependency::SearchBackend,
                    message.to_string(),
                )),
            }
        });
        Ok(stream.boxed())
    }

    async fn upsert(
        &self,
        collection: &str,
        documents: Vec<AzureSearchRecord>,
    ) -> Result<Vec<String>> {
        self.require(collection)?;
        let mut all = self.documents.lock().unwrap();
        let stored = all.entry(collection.to_string()).or_default();
        let keys = documents.iter().map(|d| d.id.clone()).collect();
        for document in documents {
            stored.insert(document.id.clone(), document);
        }
        Ok(keys)
    }

    async fn get(
        &self,
        collection: &str,
        key: &str,
        include_vectors: bool,
    ) -> Result<Option<AzureSearchRecord>> {
        let all = self.documents.lock().unwrap();
        Ok(all.get(collection).and_then(|c| c.get(key)).cloned().map(|mut d| {
            if !include_vectors {
                d.embedding.clear();
            }
            d
        }))
    }

    async fn delete(&self, collection: &str, keys: Vec<String>) -> Result<()> {
        let mut all = self.documents.lock().unwrap();
        if let Some(stored) = all.get_mut(collection) {
            for key in keys {
                stored.remove(&key);
            }
        }
        Ok(())
    }
}
