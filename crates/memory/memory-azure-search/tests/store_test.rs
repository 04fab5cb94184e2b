//! Tests for AzureSearchMemoryStore over a scripted backend.
//!
//! Covers limit and threshold handling, candidate counts, laziness, mid-stream failures
//! and the record adapter on the write and read paths.

mod common;

use common::{scored, Scripted, ScriptedBackend};
use futures::{StreamExt, TryStreamExt};
use memory_azure_search::{encode_id, AzureSearchMemoryStore};
use memory_core::{Dependency, MemoryError, MemoryRecord, MemoryStore};

fn docs_2024() -> ScriptedBackend {
    ScriptedBackend::new().with_collection(
        "docs-2024",
        vec![
            scored("doc-1", "Renewal policy", 0.91),
            scored("doc-2", "Cancellation terms", 0.77),
            scored("doc-3", "Holiday schedule", 0.40),
        ],
    )
}

#[tokio::test]
async fn test_limit_and_threshold_preserve_backend_order() {
    let backend = docs_2024();
    let store = AzureSearchMemoryStore::new(backend.clone());

    let results: Vec<_> = store
        .get_nearest_matches("docs-2024", &[0.1, 0.2], None, 2, 0.5, false)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].record.id, "doc-1");
    assert_eq!(results[0].relevance, 0.91);
    assert_eq!(results[1].record.id, "doc-2");
    assert_eq!(results[1].relevance, 0.77);
    assert_eq!(backend.last_request().unwrap().candidate_count, 4);
}

#[tokio::test]
async fn test_threshold_can_empty_results() {
    let store = AzureSearchMemoryStore::new(docs_2024());

    let results: Vec<_> = store
        .get_nearest_matches("docs-2024", &[0.1], None, 5, 0.95, false)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn test_zero_limit_rejected_before_backend_call() {
    let backend = docs_2024();
    let store = AzureSearchMemoryStore::new(backend.clone());

    let result = store
        .get_nearest_matches("docs-2024", &[0.1], None, 0, 0.0, false)
        .await;

    assert!(matches!(result, Err(MemoryError::InvalidArgument(_))));
    assert!(backend.last_request().is_none());
}

#[tokio::test]
async fn test_missing_collection_fails_up_front() {
    let store = AzureSearchMemoryStore::new(docs_2024());

    let result = store
        .get_nearest_matches("missing", &[0.1], None, 3, 0.0, false)
        .await;

    match result {
        Err(MemoryError::CollectionNotFound(name)) => assert_eq!(name, "missing"),
        Err(other) => panic!("expected CollectionNotFound, got {:?}", other),
        Ok(_) => panic!("expected CollectionNotFound, got a stream"),
    }
}

#[tokio::test]
async fn test_empty_collection_yields_nothing() {
    let store = AzureSearchMemoryStore::new(ScriptedBackend::new().with_collection("empty", vec![]));

    let results: Vec<_> = store
        .get_nearest_matches("empty", &[0.1], None, 3, 0.0, false)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn test_results_are_pulled_lazily_and_stop_at_limit() {
    let backend = ScriptedBackend::new().with_collection(
        "docs",
        vec![
            scored("a", "a", 0.9),
            scored("b", "b", 0.8),
            scored("c", "c", 0.7),
            scored("d", "d", 0.6),
        ],
    );
    let store = AzureSearchMemoryStore::new(backend.clone());

    let mut stream = store
        .get_nearest_matches("docs", &[0.1], None, 2, 0.0, false)
        .await
        .unwrap();
    assert_eq!(backend.pulled(), 0);

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.record.id, "a");
    assert_eq!(backend.pulled(), 1);

    let second = stream.next().await.unwrap().unwrap();
    assert_eq!(second.record.id, "b");
    assert!(stream.next().await.is_none());
    assert_eq!(backend.pulled(), 2);
}

#[tokio::test]
async fn test_mid_stream_failure_is_yielded_once_then_ends() {
    let backend = ScriptedBackend::new().with_collection(
        "docs",
        vec![
            scored("a", "a", 0.9),
            Scripted::Failure("page 2 failed"),
            scored("b", "b", 0.8),
        ],
    );
    let store = AzureSearchMemoryStore::new(backend);

    let items: Vec<_> = store
        .get_nearest_matches("docs", &[0.1], None, 3, 0.0, false)
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap().record.id, "a");
    let err = items[1].as_ref().unwrap_err();
    assert_eq!(err.failed_dependency(), Some(Dependency::SearchBackend));
}

#[tokio::test]
async fn test_nan_score_never_passes_threshold() {
    let backend = ScriptedBackend::new().with_collection(
        "docs",
        vec![scored("nan", "nan", f64::NAN), scored("ok", "ok", 0.1)],
    );
    let store = AzureSearchMemoryStore::new(backend);

    let results: Vec<_> = store
        .get_nearest_matches("docs", &[0.1], None, 5, 0.0, false)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].record.id, "ok");
}

#[tokio::test]
async fn test_embeddings_only_when_requested() {
    let backend = docs_2024();
    let store = AzureSearchMemoryStore::new(backend.clone());

    let without: Vec<_> = store
        .get_nearest_matches("docs-2024", &[0.1], None, 1, 0.0, false)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert!(without[0].record.embedding.is_none());
    assert!(!backend.last_request().unwrap().include_vectors);

    let with: Vec<_> = store
        .get_nearest_matches("docs-2024", &[0.1], None, 1, 0.0, true)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(with[0].record.embedding, Some(vec![0.5, 0.5]));
}

#[tokio::test]
async fn test_query_text_and_multiplier_reach_backend() {
    let backend = docs_2024();
    let store = AzureSearchMemoryStore::new(backend.clone()).with_candidate_multiplier(3);

    let _ = store
        .get_nearest_matches("docs-2024", &[0.1, 0.2], Some("renewal"), 2, 0.0, false)
        .await
        .unwrap();

    let request = backend.last_request().unwrap();
    assert_eq!(request.candidate_count, 6);
    assert_eq!(request.text_hint.as_deref(), Some("renewal"));
    assert_eq!(request.vector, vec![0.1, 0.2]);
}

#[tokio::test]
async fn test_zero_multiplier_still_requests_limit() {
    let backend = docs_2024();
    let store = AzureSearchMemoryStore::new(backend.clone()).with_candidate_multiplier(0);

    let _ = store
        .get_nearest_matches("docs-2024", &[0.1], None, 3, 0.0, false)
        .await
        .unwrap();

    assert_eq!(backend.last_request().unwrap().candidate_count, 3);
}

#[tokio::test]
async fn test_upsert_get_remove_use_real_ids() {
    let backend = ScriptedBackend::new().with_collection("notes", vec![]);
    let store = AzureSearchMemoryStore::new(backend.clone());
    let record = MemoryRecord::local(
        "résumé #7",
        "Frontend engineer",
        "resumes/jane.pdf",
        "",
        Some(vec![1.0, 0.0]),
    );

    let id = store.upsert("notes", record.clone()).await.unwrap();
    assert_eq!(id, "résumé #7");
    assert!(backend.stored("notes").contains_key(&encode_id("résumé #7")));

    let fetched = store.get("notes", "résumé #7", true).await.unwrap().unwrap();
    assert_eq!(fetched.id, "résumé #7");
    assert_eq!(fetched.text, "Frontend engineer");
    assert_eq!(fetched.embedding, Some(vec![1.0, 0.0]));
    assert_eq!(fetched.key.as_deref(), Some(encode_id("résumé #7").as_str()));

    let without = store.get("notes", "résumé #7", false).await.unwrap().unwrap();
    assert!(without.embedding.is_none());

    store.remove("notes", "résumé #7").await.unwrap();
    assert!(store.get("notes", "résumé #7", false).await.unwrap().is_none());
}

#[tokio::test]
async fn test_upsert_batch_returns_ids_in_order() {
    let backend = ScriptedBackend::new().with_collection("notes", vec![]);
    let store = AzureSearchMemoryStore::new(backend.clone());

    let ids = store
        .upsert_batch(
            "notes",
            vec![
                MemoryRecord::local("b", "second", "", "", None),
                MemoryRecord::local("a", "first", "", "", None),
            ],
        )
        .await
        .unwrap();

    assert_eq!(ids, vec!["b".to_string(), "a".to_string()]);
    assert_eq!(backend.stored("notes").len(), 2);
}

#[tokio::test]
async fn test_get_collections_lists_backend_names() {
    let backend = docs_2024().with_collection("archive", vec![]);
    let store = AzureSearchMemoryStore::new(backend);

    let names: Vec<String> = store
        .get_collections()
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(names, vec!["archive".to_string(), "docs-2024".to_string()]);
}
