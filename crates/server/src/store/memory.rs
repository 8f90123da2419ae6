//! In-process [`VectorStore`] backed by the core [`Database`].

use super::VectorStore;
use async_trait::async_trait;
use hybridsearch_core::search::{HybridQuery, ScoredPoint};
use hybridsearch_core::storage::Database;
use hybridsearch_core::vector::{CollectionSchema, PointStruct};
use hybridsearch_core::{Error, Result};

/// Store answering from memory with the same RRF semantics as Qdrant.
///
/// Missing collections surface as [`Error::UpstreamUnavailable`], the same
/// way a Qdrant 404 does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    db: Database,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn collection(&self, name: &str) -> Result<hybridsearch_core::storage::Collection> {
        self.db
            .get_collection(name)
            .ok_or_else(|| Error::UpstreamUnavailable(format!("Collection '{}' not found", name)))
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.db.collection_exists(name))
    }

    async fn collection_schema(&self, name: &str) -> Result<Option<CollectionSchema>> {
        Ok(self.db.get_collection(name).map(|c| c.schema()))
    }

    async fn create_collection(&self, name: &str, schema: &CollectionSchema) -> Result<()> {
        if self.db.collection_exists(name) {
            return Ok(());
        }
        // A concurrent creator may win the race; that is still success.
        if let Err(e) = self.db.create_collection(name.to_string(), schema.clone()) {
            tracing::debug!(collection = %name, "{}", e);
        }
        Ok(())
    }

    async fn upsert(&self, name: &str, points: Vec<PointStruct>) -> Result<()> {
        self.collection(name)?
            .upsert_points(points)
            .map(|_| ())
            .map_err(Error::UpstreamUnavailable)
    }

    async fn query(&self, name: &str, query: &HybridQuery) -> Result<Vec<ScoredPoint>> {
        Ok(self.collection(name)?.hybrid_search(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hybridsearch_core::vector::{NamedVectors, SparseVector};
    use serde_json::json;

    #[tokio::test]
    async fn create_collection_is_idempotent() {
        let store = MemoryStore::new();
        let schema = CollectionSchema::new(2);
        store.create_collection("c", &schema).await.unwrap();
        store.create_collection("c", &schema).await.unwrap();
        assert_eq!(store.database().list_collections().len(), 1);
        assert_eq!(store.collection_schema("c").await.unwrap(), Some(schema));
    }

    #[tokio::test]
    async fn missing_collection_is_upstream_error() {
        let store = MemoryStore::new();
        let point = PointStruct::new(
            NamedVectors {
                dense: vec![1.0, 0.0],
                sparse: SparseVector::default(),
            },
            json!({"description": "x"}).as_object().cloned().unwrap(),
        );
        let err = store.upsert("nope", vec![point]).await.unwrap_err();
        assert!(matches!(err, Error::UpstreamUnavailable(_)));
        assert!(!store.collection_exists("nope").await.unwrap());
        assert_eq!(store.collection_schema("nope").await.unwrap(), None);
    }
}
