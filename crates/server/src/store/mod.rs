//! Vector store clients.
//!
//! [`VectorStore`] is the narrow contract the loader and the searcher use:
//! collection management, batch upserts, and fused hybrid queries. Two
//! implementations exist: [`QdrantStore`] talks to a Qdrant server over its
//! REST API, [`MemoryStore`] answers from an in-process database.

/// In-process store over `hybridsearch_core::storage::Database`.
pub mod memory;
/// Qdrant REST API client.
pub mod qdrant;

pub use memory::MemoryStore;
pub use qdrant::QdrantStore;

use async_trait::async_trait;
use hybridsearch_core::search::{HybridQuery, ScoredPoint};
use hybridsearch_core::vector::{CollectionSchema, PointStruct};
use hybridsearch_core::Result;

/// Client contract of the external vector database.
///
/// Implementations are shared by concurrent requests and must not require
/// exclusive access for reads.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Returns whether the named collection exists.
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Returns the vector layout of the named collection, if it exists.
    async fn collection_schema(&self, name: &str) -> Result<Option<CollectionSchema>>;

    /// Creates the named collection. Succeeds without changes if it already exists.
    async fn create_collection(&self, name: &str, schema: &CollectionSchema) -> Result<()>;

    /// Writes one batch of points and waits until they are searchable.
    async fn upsert(&self, name: &str, points: Vec<PointStruct>) -> Result<()>;

    /// Runs a hybrid query fused by Reciprocal Rank Fusion.
    async fn query(&self, name: &str, query: &HybridQuery) -> Result<Vec<ScoredPoint>>;
}
