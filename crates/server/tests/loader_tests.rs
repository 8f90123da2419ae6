use hybridsearch_core::embedding::{Embedder, HashingEmbedder};
use hybridsearch_core::vector::CollectionSchema;
use hybridsearch_core::Error;
use hybridsearch_server::loader::CorpusLoader;
use hybridsearch_server::searcher::HybridSearcher;
use hybridsearch_server::store::{MemoryStore, VectorStore};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn corpus_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

fn loader(store: &MemoryStore) -> CorpusLoader {
    CorpusLoader::new(
        Arc::new(store.clone()),
        Arc::new(HashingEmbedder::new(32)),
        "startups",
    )
}

#[tokio::test]
async fn test_load_file_then_search_city() {
    let file = corpus_file(&[
        r#"{"name": "Acme", "description": "AI startup in Berlin", "city": "Berlin"}"#,
        r#"{"name": "Kiez", "description": "Bike repair shop", "city": "Berlin"}"#,
        r#"{"name": "Brie", "description": "Cheese delivery", "city": "Paris", "tags": ["food"]}"#,
    ]);
    let store = MemoryStore::new();
    let report = loader(&store).load_file(file.path()).await.unwrap();
    assert_eq!(report.records, 3);
    assert_eq!(report.batches, 1);

    let searcher = HybridSearcher::new(
        Arc::new(store.clone()),
        Arc::new(HashingEmbedder::new(32)),
        "startups",
    );
    let hits = searcher.search_city("AI", "Berlin", 5, 0.7).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["name"], "Acme");

    let hits = searcher
        .search_city("Cheese delivery", "Paris", 5, 0.7)
        .await
        .unwrap();
    assert_eq!(hits[0]["tags"], serde_json::json!(["food"]));
}

#[tokio::test]
async fn test_bad_line_aborts_before_upload() {
    let file = corpus_file(&[
        r#"{"description": "fine", "city": "Berlin"}"#,
        r#"{"city": "Berlin"}"#,
    ]);
    let store = MemoryStore::new();
    let err = loader(&store).load_file(file.path()).await.unwrap_err();
    match err {
        Error::LoadData(msg) => assert!(msg.contains("line 2"), "{}", msg),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!store.collection_exists("startups").await.unwrap());
}

#[tokio::test]
async fn test_blank_line_is_fatal() {
    let file = corpus_file(&[r#"{"description": "one"}"#, "", r#"{"description": "two"}"#]);
    let store = MemoryStore::new();
    let err = loader(&store).load_file(file.path()).await.unwrap_err();
    assert!(matches!(err, Error::LoadData(ref msg) if msg.contains("line 2")));
}

#[tokio::test]
async fn test_missing_file_is_load_error() {
    let store = MemoryStore::new();
    let err = loader(&store)
        .load_file(std::path::Path::new("/nonexistent/startups_demo.json"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::LoadData(_)));
}

#[tokio::test]
async fn test_loading_twice_keeps_one_collection() {
    let file = corpus_file(&[r#"{"description": "AI startup in Berlin", "city": "Berlin"}"#]);
    let store = MemoryStore::new();
    loader(&store).load_file(file.path()).await.unwrap();
    loader(&store).load_file(file.path()).await.unwrap();

    assert_eq!(store.database().list_collections().len(), 1);
    // Fresh UUIDs on each load: records are appended, not replaced.
    let col = store.database().get_collection("startups").unwrap();
    assert_eq!(col.point_count(), 2);
}

#[tokio::test]
async fn test_existing_collection_with_other_layout_is_rejected() {
    let store = MemoryStore::new();
    store
        .create_collection("startups", &CollectionSchema::new(768))
        .await
        .unwrap();
    let file = corpus_file(&[r#"{"description": "AI"}"#]);
    let err = loader(&store).load_file(file.path()).await.unwrap_err();
    match err {
        Error::CollectionConfigMismatch {
            name,
            expected,
            found,
        } => {
            assert_eq!(name, "startups");
            assert!(expected.contains("32"));
            assert!(found.contains("768"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_concurrent_batches_upload_everything() {
    let lines: Vec<String> = (0..50)
        .map(|i| format!(r#"{{"description": "company {}", "city": "Berlin", "rank": {}}}"#, i, i))
        .collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let file = corpus_file(&refs);
    let store = MemoryStore::new();
    let report = loader(&store)
        .with_batch_size(7)
        .with_parallelism(4)
        .load_file(file.path())
        .await
        .unwrap();
    assert_eq!(report.records, 50);
    assert_eq!(report.batches, 8);
    let col = store.database().get_collection("startups").unwrap();
    assert_eq!(col.point_count(), 50);
    assert_eq!(col.schema(), HashingEmbedder::new(32).schema());
}
