//! Collection and database data structures.
//!
//! A [`Collection`] holds points (dense vector, sparse vector, payload) under a
//! fixed [`CollectionSchema`] and answers [`HybridQuery`]s by exhaustive
//! dense and sparse scoring followed by RRF fusion.
//! [`Database`] manages named collections with thread-safe concurrent access.

use crate::document::Payload;
use crate::filter_types::FilterClause;
use crate::search::filter::matches_filter;
use crate::search::hybrid::rrf_fusion;
use crate::search::{HybridQuery, ScoredPoint};
use crate::vector::{CollectionSchema, NamedVectors, PointStruct, SparseVector};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// A stored point.
#[derive(Debug, Clone)]
pub struct StoredPoint {
    pub id: Uuid,
    pub vectors: NamedVectors,
    pub payload: Payload,
}

/// Internal data for a collection, protected by a `RwLock`.
#[derive(Debug)]
pub struct CollectionData {
    pub name: String,
    pub schema: CollectionSchema,
    /// Points indexed by internal u32 id.
    pub points: Vec<Arc<StoredPoint>>,
    /// UUID → internal u32 id.
    pub uuid_to_internal: HashMap<Uuid, u32>,
}

impl CollectionData {
    /// Creates a new empty collection with the given name and schema.
    pub fn new(name: String, schema: CollectionSchema) -> Self {
        Self {
            name,
            schema,
            points: Vec::new(),
            uuid_to_internal: HashMap::new(),
        }
    }

    fn validate_point(&self, point: &PointStruct) -> Result<(), String> {
        let dense = &point.vectors.dense;
        if dense.len() != self.schema.dense_size {
            return Err(format!(
                "Point {}: expected dense dimension {}, got {}",
                point.id,
                self.schema.dense_size,
                dense.len()
            ));
        }
        if dense.iter().any(|v| !v.is_finite()) {
            return Err(format!("Point {}: dense vector contains NaN or Inf", point.id));
        }
        point
            .vectors
            .sparse
            .validate()
            .map_err(|e| format!("Point {}: {}", point.id, e))
    }

    /// Inserts or replaces a point, keeping its internal id on replace.
    fn upsert(&mut self, point: PointStruct) {
        let stored = Arc::new(StoredPoint {
            id: point.id,
            vectors: point.vectors,
            payload: point.payload,
        });
        match self.uuid_to_internal.get(&point.id) {
            Some(&internal_id) => self.points[internal_id as usize] = stored,
            None => {
                let internal_id = self.points.len() as u32;
                self.uuid_to_internal.insert(point.id, internal_id);
                self.points.push(stored);
            }
        }
    }

    fn eligible(&self, internal_id: usize, filter: Option<&FilterClause>) -> bool {
        filter.map_or(true, |f| matches_filter(&self.points[internal_id].payload, f))
    }

    /// Top `limit` points by dense similarity, as `(internal_id, similarity)`.
    fn dense_candidates(
        &self,
        query: &[f32],
        limit: usize,
        filter: Option<&FilterClause>,
    ) -> Vec<(u32, f32)> {
        let distance = self.schema.distance;
        let scored = self
            .points
            .iter()
            .enumerate()
            .filter(|(i, _)| self.eligible(*i, filter))
            .map(|(i, p)| (i as u32, distance.similarity(query, &p.vectors.dense)))
            .collect();
        top_k(scored, limit)
    }

    /// Top `limit` points sharing at least one term with `query`.
    fn sparse_candidates(
        &self,
        query: &SparseVector,
        limit: usize,
        filter: Option<&FilterClause>,
    ) -> Vec<(u32, f32)> {
        let scored = self
            .points
            .iter()
            .enumerate()
            .filter(|(i, _)| self.eligible(*i, filter))
            .filter_map(|(i, p)| query.dot(&p.vectors.sparse).map(|s| (i as u32, s)))
            .collect();
        top_k(scored, limit)
    }
}

/// Sorts by descending score (lower internal id first on ties) and truncates.
fn top_k(mut scored: Vec<(u32, f32)>, k: usize) -> Vec<(u32, f32)> {
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.truncate(k);
    scored
}

/// Thread-safe handle to a collection.
///
/// Cloning a `Collection` produces a new handle to the same shared data.
#[derive(Debug, Clone)]
pub struct Collection {
    pub data: Arc<RwLock<CollectionData>>,
}

impl Collection {
    /// Creates a new empty collection.
    pub fn new(name: String, schema: CollectionSchema) -> Self {
        Self {
            data: Arc::new(RwLock::new(CollectionData::new(name, schema))),
        }
    }

    /// Returns the collection's vector layout.
    pub fn schema(&self) -> CollectionSchema {
        self.data.read().schema.clone()
    }

    /// Inserts or replaces a batch of points.
    ///
    /// The whole batch is validated against the schema first; on error nothing
    /// is written. Returns the number of points written.
    pub fn upsert_points(&self, points: Vec<PointStruct>) -> Result<usize, String> {
        let mut data = self.data.write();
        for point in &points {
            data.validate_point(point)?;
        }
        let count = points.len();
        for point in points {
            data.upsert(point);
        }
        Ok(count)
    }

    /// Retrieves a point by UUID.
    pub fn get_point(&self, id: &Uuid) -> Option<Arc<StoredPoint>> {
        let data = self.data.read();
        let internal_id = *data.uuid_to_internal.get(id)?;
        data.points.get(internal_id as usize).cloned()
    }

    /// Returns the number of stored points.
    pub fn point_count(&self) -> usize {
        self.data.read().points.len()
    }

    /// Runs a hybrid query: filtered dense and sparse prefetches fused by RRF.
    ///
    /// Returns at most `query.limit` points sorted by descending fused score,
    /// all scoring at least `query.score_threshold`.
    pub fn hybrid_search(&self, query: &HybridQuery) -> Vec<ScoredPoint> {
        let data = self.data.read();
        let filter = query.filter.as_ref();

        let dense_results = data.dense_candidates(&query.dense, query.prefetch_limit, filter);
        let sparse_results = data.sparse_candidates(&query.sparse, query.prefetch_limit, filter);

        rrf_fusion(&dense_results, &sparse_results, query.limit)
            .into_iter()
            .filter(|&(_, score)| query.score_threshold.map_or(true, |t| score >= t))
            .filter_map(|(internal_id, score)| {
                let point = data.points.get(internal_id as usize)?;
                Some(ScoredPoint {
                    id: point.id,
                    score,
                    payload: point.payload.clone(),
                })
            })
            .collect()
    }
}

/// Named collections with thread-safe concurrent access.
#[derive(Debug, Clone, Default)]
pub struct Database {
    pub collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl Database {
    /// Creates a new empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new collection. Returns `Err` if a collection with the same name already exists.
    pub fn create_collection(&self, name: String, schema: CollectionSchema) -> Result<(), String> {
        let mut collections = self.collections.write();
        if collections.contains_key(&name) {
            return Err(format!("Collection '{}' already exists", name));
        }
        tracing::debug!(collection = %name, schema = %schema, "In-memory collection created");
        collections.insert(name.clone(), Collection::new(name, schema));
        Ok(())
    }

    /// Returns a cloned handle to the named collection, or `None` if not found.
    pub fn get_collection(&self, name: &str) -> Option<Collection> {
        self.collections.read().get(name).cloned()
    }

    pub fn collection_exists(&self, name: &str) -> bool {
        self.collections.read().contains_key(name)
    }

    /// Returns the names of all collections.
    pub fn list_collections(&self) -> Vec<String> {
        self.collections.read().keys().cloned().collect()
    }
}
