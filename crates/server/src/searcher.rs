//! Hybrid searcher: embeds a query and issues one fused dense + sparse query.

use crate::api::metrics;
use crate::store::VectorStore;
use hybridsearch_core::config;
use hybridsearch_core::document::Payload;
use hybridsearch_core::embedding::Embedder;
use hybridsearch_core::filter_types::FilterClause;
use hybridsearch_core::search::HybridQuery;
use hybridsearch_core::vector::NamedVectors;
use hybridsearch_core::{Error, Result};
use std::sync::Arc;

/// Read-path entry point shared by every request handler.
///
/// Cloning is cheap: the store and embedder are behind `Arc`.
#[derive(Clone)]
pub struct HybridSearcher {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    collection: String,
}

impl HybridSearcher {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            embedder,
            collection: collection.into(),
        }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Searches the collection and returns result payloads in fused-rank order.
    ///
    /// Arguments are validated before anything is embedded or sent.
    pub async fn search(
        &self,
        text: &str,
        limit: usize,
        score_threshold: f32,
        filter: Option<FilterClause>,
    ) -> Result<Vec<Payload>> {
        validate_query(text, limit, score_threshold)?;

        let vectors = self.embed_query(text).await?;
        let search_type = if filter.is_some() { "city" } else { "plain" };
        let query = HybridQuery {
            dense: vectors.dense,
            sparse: vectors.sparse,
            filter,
            prefetch_limit: limit.max(config::PREFETCH_LIMIT),
            limit,
            score_threshold: Some(score_threshold),
        };

        let hits = self.store.query(&self.collection, &query).await?;
        metrics::record_search_operation(&self.collection, search_type);
        tracing::debug!(
            collection = %self.collection,
            limit,
            score_threshold,
            hits = hits.len(),
            "Hybrid search complete"
        );
        Ok(hits.into_iter().map(|hit| hit.payload).collect())
    }

    /// Same as [`search`](Self::search), restricted to points whose `city` equals `city`.
    pub async fn search_city(
        &self,
        text: &str,
        city: &str,
        limit: usize,
        score_threshold: f32,
    ) -> Result<Vec<Payload>> {
        if city.trim().is_empty() {
            return Err(Error::InvalidQuery("city must not be empty".into()));
        }
        let filter = FilterClause::must_match(config::CITY_FIELD, city);
        self.search(text, limit, score_threshold, Some(filter)).await
    }

    async fn embed_query(&self, text: &str) -> Result<NamedVectors> {
        let embedder = Arc::clone(&self.embedder);
        let texts = vec![text.to_string()];
        let mut vectors = tokio::task::spawn_blocking(move || embedder.embed(&texts))
            .await
            .map_err(|e| Error::Embedding(format!("embedding task failed: {}", e)))??;
        vectors
            .pop()
            .ok_or_else(|| Error::Embedding("embedder returned no vectors".into()))
    }
}

fn validate_query(text: &str, limit: usize, score_threshold: f32) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::InvalidQuery("query must not be empty".into()));
    }
    if text.len() > config::MAX_QUERY_LEN {
        return Err(Error::InvalidQuery(format!(
            "query exceeds maximum length of {} bytes",
            config::MAX_QUERY_LEN
        )));
    }
    if limit == 0 || limit > config::MAX_LIMIT {
        return Err(Error::InvalidQuery(format!(
            "limit must be between 1 and {}",
            config::MAX_LIMIT
        )));
    }
    if !score_threshold.is_finite()
        || !(config::MIN_SCORE_THRESHOLD..=config::MAX_SCORE_THRESHOLD).contains(&score_threshold)
    {
        return Err(Error::InvalidQuery(format!(
            "score_threshold must be between {} and {}",
            config::MIN_SCORE_THRESHOLD,
            config::MAX_SCORE_THRESHOLD
        )));
    }
    Ok(())
}
