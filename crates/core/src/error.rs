//! Error taxonomy shared by the loader, the searcher, and the HTTP layer.

use thiserror::Error;

/// Errors produced while loading the corpus or answering a search.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Malformed or out-of-range query parameters.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// The vector store could not be reached or rejected the request.
    #[error("Vector store unavailable: {0}")]
    UpstreamUnavailable(String),
    /// Malformed corpus line or embedding failure during an offline load.
    #[error("Load failed: {0}")]
    LoadData(String),
    /// An existing collection was created with a different vector layout.
    #[error("Collection '{name}' has schema {found}, expected {expected}")]
    CollectionConfigMismatch {
        name: String,
        expected: String,
        found: String,
    },
    /// The embedding provider failed on the query path.
    #[error("Embedding failed: {0}")]
    Embedding(String),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;
