//! Global configuration constants for hybridsearch.
//!
//! Model names, vector names, query limits, and process defaults are defined
//! here. These are compile-time constants; runtime configuration is handled via
//! CLI arguments and environment variables in the binaries.

/// Dense embedding model used for semantic similarity.
pub const DENSE_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Output dimension of [`DENSE_MODEL`].
pub const DENSE_DIMENSION: usize = 384;

/// Sparse (SPLADE) embedding model used for term-overlap similarity.
pub const SPARSE_MODEL: &str = "prithivida/Splade_PP_en_v1";

/// Name of the dense vector stored on every point.
pub const DENSE_VECTOR_NAME: &str = "dense";

/// Name of the sparse vector stored on every point.
pub const SPARSE_VECTOR_NAME: &str = "sparse";

/// Payload field used by city-filtered search.
pub const CITY_FIELD: &str = "city";

/// Payload field every corpus record must carry.
pub const DESCRIPTION_FIELD: &str = "description";

/// Reciprocal Rank Fusion (RRF) constant `k`.
///
/// Used in the formula `1 / (k + position)` where `position` is the 0-based
/// rank of a candidate in one prefetch list. With `k = 2` a candidate ranked
/// first in both lists scores exactly 1.0, which is the value Qdrant uses.
pub const RRF_K: f32 = 2.0;

/// Lower bound of the fused score range.
pub const MIN_SCORE_THRESHOLD: f32 = 0.0;

/// Upper bound of the fused score range (first in both prefetch lists).
pub const MAX_SCORE_THRESHOLD: f32 = 1.0;

/// Minimum number of candidates fetched by each prefetch before fusion.
pub const PREFETCH_LIMIT: usize = 10;

/// Default number of results per search request.
pub const DEFAULT_LIMIT: usize = 5;

/// Default fused score threshold per search request.
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.7;

/// Maximum number of results per search request.
pub const MAX_LIMIT: usize = 1_000;

/// Maximum length of a query string in bytes.
pub const MAX_QUERY_LEN: usize = 4_096;

/// Default collection name.
pub const DEFAULT_COLLECTION: &str = "startups";

/// Default Qdrant REST endpoint.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6333";

/// Default HTTP server port.
pub const DEFAULT_PORT: u16 = 9000;

/// Default HTTP bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default origin allowed by CORS (the React dev server).
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Default corpus file consumed by the loader.
pub const DEFAULT_CORPUS_PATH: &str = "startups_demo.json";

/// Default number of upload batches in flight during a load.
pub const DEFAULT_UPLOAD_PARALLELISM: usize = 4;

/// Default number of records embedded and upserted per batch.
pub const DEFAULT_UPLOAD_BATCH_SIZE: usize = 64;

/// Per-request timeout of the HTTP façade, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Timeout of a single call to the vector store, in seconds.
pub const STORE_TIMEOUT_SECS: u64 = 30;
