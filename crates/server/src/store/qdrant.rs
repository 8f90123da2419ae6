//! Qdrant implementation of [`VectorStore`] over the REST API.
//!
//! Endpoints used:
//! - `GET  /collections/{name}/exists`
//! - `GET  /collections/{name}`
//! - `PUT  /collections/{name}`
//! - `PUT  /collections/{name}/points?wait=true`
//! - `POST /collections/{name}/points/query`

use super::VectorStore;
use crate::api::metrics;
use async_trait::async_trait;
use hybridsearch_core::config;
use hybridsearch_core::document::Payload;
use hybridsearch_core::filter_types::FilterClause;
use hybridsearch_core::search::{HybridQuery, ScoredPoint};
use hybridsearch_core::vector::{CollectionSchema, Distance, PointStruct, SparseVector};
use hybridsearch_core::{Error, Result};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Qdrant REST client bound to one server.
///
/// Holds a single pooled [`reqwest::Client`]; cloning shares the pool.
#[derive(Debug, Clone)]
pub struct QdrantStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl QdrantStore {
    /// Creates a client for the Qdrant server at `base_url` (e.g. `http://localhost:6333`).
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::UpstreamUnavailable(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Build a request with optional API key header.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            req = req.header("api-key", key);
        }
        req
    }

    /// Sends a request and returns the raw response, mapping transport failures.
    async fn send(&self, operation: &str, req: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let start = Instant::now();
        let result = req.send().await;
        let status = match &result {
            Ok(resp) if resp.status().is_success() => "success",
            _ => "error",
        };
        metrics::record_store_operation(operation, status, start.elapsed());
        result.map_err(|e| {
            tracing::warn!(operation, error = %e, "Qdrant request failed");
            Error::UpstreamUnavailable(format!("Qdrant {} request failed: {}", operation, e))
        })
    }

    /// Decodes `{"result": T}` from a successful response, or reports the error body.
    async fn decode<T: DeserializeOwned>(operation: &str, resp: reqwest::Response) -> Result<T> {
        let resp = Self::ensure_success(operation, resp).await?;
        let body: QdrantResponse<T> = resp.json().await.map_err(|e| {
            Error::UpstreamUnavailable(format!("Qdrant {} returned an unexpected body: {}", operation, e))
        })?;
        Ok(body.result)
    }

    async fn ensure_success(operation: &str, resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let error_text = resp.text().await.unwrap_or_default();
        tracing::warn!(operation, %status, error = %error_text, "Qdrant returned an error");
        Err(Error::UpstreamUnavailable(format!(
            "Qdrant {} failed with {}: {}",
            operation, status, error_text
        )))
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let req = self.request(Method::GET, &format!("/collections/{}/exists", name));
        let resp = self.send("collection_exists", req).await?;
        let result: ExistsResult = Self::decode("collection_exists", resp).await?;
        Ok(result.exists)
    }

    async fn collection_schema(&self, name: &str) -> Result<Option<CollectionSchema>> {
        let req = self.request(Method::GET, &format!("/collections/{}", name));
        let resp = self.send("collection_info", req).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let info: CollectionInfo = Self::decode("collection_info", resp).await?;
        info.config.params.into_schema(name).map(Some)
    }

    async fn create_collection(&self, name: &str, schema: &CollectionSchema) -> Result<()> {
        let body = CreateCollectionRequest::from_schema(schema);
        let req = self
            .request(Method::PUT, &format!("/collections/{}", name))
            .json(&body);
        let resp = self.send("create_collection", req).await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            if status == StatusCode::CONFLICT || error_text.contains("already exists") {
                tracing::debug!(collection = %name, "Collection already exists");
                return Ok(());
            }
            return Err(Error::UpstreamUnavailable(format!(
                "Failed to create collection '{}' ({}): {}",
                name, status, error_text
            )));
        }

        tracing::info!(collection = %name, schema = %schema, "Collection created");
        Ok(())
    }

    async fn upsert(&self, name: &str, points: Vec<PointStruct>) -> Result<()> {
        let count = points.len();
        let body = UpsertPointsRequest {
            points: points.iter().map(QdrantPoint::from_point).collect(),
        };
        let req = self
            .request(Method::PUT, &format!("/collections/{}/points", name))
            .query(&[("wait", "true")])
            .json(&body);
        let resp = self.send("upsert", req).await?;
        Self::ensure_success("upsert", resp).await?;
        tracing::debug!(collection = %name, count, "Points upserted");
        Ok(())
    }

    async fn query(&self, name: &str, query: &HybridQuery) -> Result<Vec<ScoredPoint>> {
        let body = QueryRequest::from_query(query);
        let req = self
            .request(Method::POST, &format!("/collections/{}/points/query", name))
            .json(&body);
        let resp = self.send("query", req).await?;
        let result: QueryResult = Self::decode("query", resp).await?;
        Ok(result
            .points
            .into_iter()
            .map(|p| ScoredPoint {
                id: p.id.into_uuid(),
                score: p.score,
                payload: p.payload.unwrap_or_default(),
            })
            .collect())
    }
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct QdrantResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct ExistsResult {
    exists: bool,
}

#[derive(Debug, Serialize)]
struct DenseVectorParams {
    size: usize,
    distance: Distance,
}

#[derive(Debug, Serialize)]
struct SparseVectorParams {}

#[derive(Debug, Serialize)]
pub(crate) struct CreateCollectionRequest<'a> {
    vectors: HashMap<&'a str, DenseVectorParams>,
    sparse_vectors: HashMap<&'a str, SparseVectorParams>,
}

impl<'a> CreateCollectionRequest<'a> {
    fn from_schema(schema: &'a CollectionSchema) -> Self {
        Self {
            vectors: HashMap::from([(
                schema.dense_name.as_str(),
                DenseVectorParams {
                    size: schema.dense_size,
                    distance: schema.distance,
                },
            )]),
            sparse_vectors: HashMap::from([(schema.sparse_name.as_str(), SparseVectorParams {})]),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    config: CollectionConfig,
}

#[derive(Debug, Deserialize)]
struct CollectionConfig {
    params: CollectionParams,
}

#[derive(Debug, Deserialize)]
struct CollectionParams {
    #[serde(default)]
    vectors: Option<VectorsConfig>,
    #[serde(default)]
    sparse_vectors: Option<BTreeMap<String, serde_json::Value>>,
}

/// Dense space as reported by collection info. The distance stays raw so
/// metrics this client does not model still parse.
#[derive(Debug, Deserialize)]
struct DenseVectorInfo {
    size: usize,
    distance: String,
}

/// Qdrant reports either one unnamed dense space or a map of named ones.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VectorsConfig {
    Single(DenseVectorInfo),
    Named(BTreeMap<String, DenseVectorInfo>),
}

impl CollectionParams {
    fn into_schema(self, collection: &str) -> Result<CollectionSchema> {
        let (dense_name, dense) = match self.vectors {
            Some(VectorsConfig::Single(params)) => (String::new(), Some(params)),
            Some(VectorsConfig::Named(mut named)) => {
                match named.remove_entry(config::DENSE_VECTOR_NAME) {
                    Some((name, params)) => (name, Some(params)),
                    None => match named.into_iter().next() {
                        Some((name, params)) => (name, Some(params)),
                        None => (String::new(), None),
                    },
                }
            }
            None => (String::new(), None),
        };
        let sparse_name = self
            .sparse_vectors
            .and_then(|mut sparse| {
                if sparse.contains_key(config::SPARSE_VECTOR_NAME) {
                    Some(config::SPARSE_VECTOR_NAME.to_string())
                } else {
                    sparse.pop_first().map(|(name, _)| name)
                }
            })
            .unwrap_or_default();
        let (dense_size, distance) = match dense {
            Some(info) => {
                let distance = serde_json::from_value::<Distance>(serde_json::Value::String(
                    info.distance.clone(),
                ))
                .map_err(|_| Error::CollectionConfigMismatch {
                    name: collection.to_string(),
                    expected: "a Cosine, Euclid, Dot or Manhattan dense space".to_string(),
                    found: format!("{}[{}; {}]", dense_name, info.size, info.distance),
                })?;
                (info.size, distance)
            }
            None => (0, Distance::Cosine),
        };
        Ok(CollectionSchema {
            dense_name,
            dense_size,
            distance,
            sparse_name,
        })
    }
}

/// Vector input: dense arrays and sparse objects share the same JSON slot.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum VectorInput<'a> {
    Dense(&'a [f32]),
    Sparse(&'a SparseVector),
}

#[derive(Debug, Serialize)]
struct QdrantPoint<'a> {
    id: Uuid,
    vector: HashMap<&'static str, VectorInput<'a>>,
    payload: &'a Payload,
}

impl<'a> QdrantPoint<'a> {
    fn from_point(point: &'a PointStruct) -> Self {
        Self {
            id: point.id,
            vector: HashMap::from([
                (config::DENSE_VECTOR_NAME, VectorInput::Dense(&point.vectors.dense)),
                (config::SPARSE_VECTOR_NAME, VectorInput::Sparse(&point.vectors.sparse)),
            ]),
            payload: &point.payload,
        }
    }
}

#[derive(Debug, Serialize)]
struct UpsertPointsRequest<'a> {
    points: Vec<QdrantPoint<'a>>,
}

#[derive(Debug, Serialize)]
struct Prefetch<'a> {
    query: VectorInput<'a>,
    using: &'static str,
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a FilterClause>,
}

#[derive(Debug, Serialize)]
struct FusionQuery {
    fusion: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct QueryRequest<'a> {
    prefetch: Vec<Prefetch<'a>>,
    query: FusionQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a FilterClause>,
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    score_threshold: Option<f32>,
    with_payload: bool,
}

impl<'a> QueryRequest<'a> {
    fn from_query(query: &'a HybridQuery) -> Self {
        let filter = query.filter.as_ref().filter(|f| !f.is_empty());
        Self {
            prefetch: vec![
                Prefetch {
                    query: VectorInput::Dense(&query.dense),
                    using: config::DENSE_VECTOR_NAME,
                    limit: query.prefetch_limit,
                    filter,
                },
                Prefetch {
                    query: VectorInput::Sparse(&query.sparse),
                    using: config::SPARSE_VECTOR_NAME,
                    limit: query.prefetch_limit,
                    filter,
                },
            ],
            query: FusionQuery { fusion: "rrf" },
            filter,
            limit: query.limit,
            score_threshold: query.score_threshold,
            with_payload: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    points: Vec<QdrantScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct QdrantScoredPoint {
    id: PointId,
    score: f32,
    #[serde(default)]
    payload: Option<Payload>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PointId {
    Uuid(Uuid),
    Num(u64),
}

impl PointId {
    fn into_uuid(self) -> Uuid {
        match self {
            PointId::Uuid(id) => id,
            PointId::Num(n) => Uuid::from_u128(n as u128),
        }
    }
}
