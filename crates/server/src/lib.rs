//! hybridsearch-server: async layer of hybridsearch.
//!
//! Provides the vector store clients, the hybrid searcher, the corpus loader,
//! and the REST API. Domain types and fusion live in `hybridsearch-core`.

/// REST API layer: Axum router, HTTP handlers, models, metrics.
pub mod api;
/// Offline corpus loader.
pub mod loader;
/// Hybrid dense + sparse search over a vector store.
pub mod searcher;
/// Vector store contract and its Qdrant and in-memory implementations.
pub mod store;
