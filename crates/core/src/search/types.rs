//! Hybrid query and scored point types.

use crate::document::Payload;
use crate::filter_types::FilterClause;
use crate::vector::SparseVector;
use uuid::Uuid;

/// One fused query: a dense prefetch and a sparse prefetch combined by RRF.
///
/// The filter applies to both prefetches, so filtering happens before fusion.
#[derive(Debug, Clone)]
pub struct HybridQuery {
    /// Dense embedding of the query text.
    pub dense: Vec<f32>,
    /// Sparse embedding of the query text.
    pub sparse: SparseVector,
    /// Optional payload predicate restricting eligible points.
    pub filter: Option<FilterClause>,
    /// Candidates fetched per prefetch before fusion.
    pub prefetch_limit: usize,
    /// Maximum number of fused results.
    pub limit: usize,
    /// Fused results scoring below this are dropped.
    pub score_threshold: Option<f32>,
}

/// A point returned by a query, with its fused score.
///
/// `score` is the RRF score for hybrid queries, in `[0.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    pub id: Uuid,
    pub score: f32,
    pub payload: Payload,
}
