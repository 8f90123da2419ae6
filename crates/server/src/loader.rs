//! Offline corpus loader: parse, embed, and upload in concurrent batches.

use crate::api::metrics;
use crate::store::VectorStore;
use futures::stream::{self, TryStreamExt};
use hybridsearch_core::config;
use hybridsearch_core::document::{parse_corpus, Record};
use hybridsearch_core::embedding::Embedder;
use hybridsearch_core::vector::PointStruct;
use hybridsearch_core::{Error, Result};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Summary of a completed load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub records: usize,
    pub batches: usize,
    pub elapsed: Duration,
}

/// Uploads a newline-delimited JSON corpus into one collection.
pub struct CorpusLoader {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    collection: String,
    parallelism: usize,
    batch_size: usize,
}

impl CorpusLoader {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            embedder,
            collection: collection.into(),
            parallelism: config::DEFAULT_UPLOAD_PARALLELISM,
            batch_size: config::DEFAULT_UPLOAD_BATCH_SIZE,
        }
    }

    /// Maximum number of batches embedded and uploaded at once.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Creates the collection if missing; otherwise checks its vector layout.
    pub async fn ensure_collection(&self) -> Result<()> {
        let expected = self.embedder.schema();
        if !self.store.collection_exists(&self.collection).await? {
            self.store
                .create_collection(&self.collection, &expected)
                .await?;
            tracing::info!(collection = %self.collection, schema = %expected, "Created collection");
            return Ok(());
        }

        match self.store.collection_schema(&self.collection).await? {
            Some(found) if found == expected => {
                tracing::info!(collection = %self.collection, "Collection already exists");
                Ok(())
            }
            Some(found) => Err(Error::CollectionConfigMismatch {
                name: self.collection.clone(),
                expected: expected.to_string(),
                found: found.to_string(),
            }),
            // Deleted between the two calls.
            None => self.store.create_collection(&self.collection, &expected).await,
        }
    }

    /// Reads and uploads the corpus at `path`.
    pub async fn load_file(&self, path: &Path) -> Result<LoadReport> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::LoadData(format!("cannot read {}: {}", path.display(), e)))?;
        let records = parse_corpus(&contents)?;
        tracing::info!(path = %path.display(), records = records.len(), "Corpus parsed");
        self.load_records(records).await
    }

    /// Ensures the collection and uploads `records` in concurrent batches.
    ///
    /// The first failing batch aborts the load. Batches already written stay.
    pub async fn load_records(&self, records: Vec<Record>) -> Result<LoadReport> {
        if self.parallelism == 0 {
            return Err(Error::LoadData("parallelism must be > 0".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::LoadData("batch size must be > 0".into()));
        }

        self.ensure_collection().await?;

        let start = Instant::now();
        let total = records.len();
        let batches: Vec<(usize, Vec<Record>)> = records
            .chunks(self.batch_size)
            .enumerate()
            .map(|(i, chunk)| (i * self.batch_size + 1, chunk.to_vec()))
            .collect();
        let batch_count = batches.len();
        let uploaded = AtomicUsize::new(0);
        let uploaded_ref = &uploaded;

        stream::iter(batches.into_iter().map(Ok::<_, Error>))
            .try_for_each_concurrent(self.parallelism, move |(first_line, batch)| {
                let uploaded = uploaded_ref;
                async move {
                    let count = self.upload_batch(first_line, batch).await?;
                    let done = uploaded.fetch_add(count, Ordering::Relaxed) + count;
                    tracing::info!(
                        collection = %self.collection,
                        first_line,
                        count,
                        done,
                        total,
                        "Batch uploaded"
                    );
                    Ok(())
                }
            })
            .await?;

        let report = LoadReport {
            records: uploaded.into_inner(),
            batches: batch_count,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            collection = %self.collection,
            records = report.records,
            batches = report.batches,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Load complete"
        );
        Ok(report)
    }

    async fn upload_batch(&self, first_line: usize, batch: Vec<Record>) -> Result<usize> {
        let embedder = Arc::clone(&self.embedder);
        let texts: Vec<String> = batch.iter().map(|r| r.description.clone()).collect();
        let vectors = tokio::task::spawn_blocking(move || embedder.embed(&texts))
            .await
            .map_err(|e| Error::LoadData(format!("embedding task failed: {}", e)))?
            .map_err(|e| {
                Error::LoadData(format!(
                    "embedding batch starting at line {} failed: {}",
                    first_line, e
                ))
            })?;

        let points: Vec<PointStruct> = vectors
            .into_iter()
            .zip(batch)
            .map(|(v, record)| PointStruct::new(v, record.payload))
            .collect();
        let count = points.len();
        self.store.upsert(&self.collection, points).await?;
        metrics::record_points_uploaded(&self.collection, count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use hybridsearch_core::embedding::HashingEmbedder;
    use hybridsearch_core::vector::SparseVector;

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                Record::from_json_line(
                    &format!(r#"{{"description": "startup number {}", "city": "Berlin"}}"#, i),
                    i + 1,
                )
                .unwrap()
            })
            .collect()
    }

    fn loader(store: &MemoryStore) -> CorpusLoader {
        CorpusLoader::new(
            Arc::new(store.clone()),
            Arc::new(HashingEmbedder::new(16)),
            "startups",
        )
    }

    #[tokio::test]
    async fn uploads_every_record_in_batches() {
        let store = MemoryStore::new();
        let report = loader(&store)
            .with_batch_size(3)
            .with_parallelism(2)
            .load_records(records(10))
            .await
            .unwrap();
        assert_eq!(report.records, 10);
        assert_eq!(report.batches, 4);
        let col = store.database().get_collection("startups").unwrap();
        assert_eq!(col.point_count(), 10);
    }

    #[tokio::test]
    async fn empty_corpus_creates_collection_only() {
        let store = MemoryStore::new();
        let report = loader(&store).load_records(Vec::new()).await.unwrap();
        assert_eq!(report.records, 0);
        assert_eq!(report.batches, 0);
        assert!(store.database().collection_exists("startups"));
    }

    #[tokio::test]
    async fn zero_parallelism_or_batch_size_is_rejected() {
        let store = MemoryStore::new();
        let err = loader(&store)
            .with_parallelism(0)
            .load_records(records(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LoadData(_)));
        let err = loader(&store)
            .with_batch_size(0)
            .load_records(records(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LoadData(_)));
        assert!(!store.database().collection_exists("startups"));
    }

    #[tokio::test]
    async fn ensure_collection_twice_is_ok() {
        let store = MemoryStore::new();
        let l = loader(&store);
        l.ensure_collection().await.unwrap();
        l.ensure_collection().await.unwrap();
        assert_eq!(store.database().list_collections(), vec!["startups".to_string()]);
    }

    #[tokio::test]
    async fn mismatched_schema_is_reported() {
        let store = MemoryStore::new();
        store
            .create_collection("startups", &hybridsearch_core::vector::CollectionSchema::new(8))
            .await
            .unwrap();
        let err = loader(&store).ensure_collection().await.unwrap_err();
        assert!(matches!(err, Error::CollectionConfigMismatch { .. }));
    }

    struct Failing;

    impl Embedder for Failing {
        fn dense_model(&self) -> &str {
            "failing"
        }
        fn sparse_model(&self) -> &str {
            "failing"
        }
        fn dense_dimension(&self) -> usize {
            4
        }
        fn embed_dense(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(Error::Embedding("model not loaded".into()))
        }
        fn embed_sparse(&self, _texts: &[String]) -> Result<Vec<SparseVector>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn embedding_failure_names_first_line() {
        let store = MemoryStore::new();
        let err = CorpusLoader::new(Arc::new(store.clone()), Arc::new(Failing), "startups")
            .with_batch_size(2)
            .with_parallelism(1)
            .load_records(records(2))
            .await
            .unwrap_err();
        match err {
            Error::LoadData(msg) => assert!(msg.contains("line 1"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
