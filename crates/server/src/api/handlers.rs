//! HTTP request handlers and shared application state.

use crate::api::errors::ApiError;
use crate::api::models::*;
use crate::searcher::HybridSearcher;
use crate::store::VectorStore;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use hybridsearch_core::document::Payload;
use metrics_exporter_prometheus::PrometheusHandle;
use std::time::Instant;

/// Shared application state passed to every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub searcher: HybridSearcher,
    pub prometheus_handle: PrometheusHandle,
    pub start_time: Instant,
}

/// `GET /api/search`
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Payload>>, ApiError> {
    let Query(params) = params?;
    let results = state
        .searcher
        .search(&params.query, params.limit, params.score_threshold, None)
        .await?;
    Ok(Json(results))
}

/// `GET /api/search_city`
pub async fn search_city(
    State(state): State<AppState>,
    params: Result<Query<SearchCityParams>, QueryRejection>,
) -> Result<Json<Vec<Payload>>, ApiError> {
    let Query(params) = params?;
    let results = state
        .searcher
        .search_city(
            &params.query,
            &params.city,
            params.limit,
            params.score_threshold,
        )
        .await?;
    Ok(Json(results))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let collection = state.searcher.collection().to_string();
    let store_reachable = match state.searcher.store().collection_exists(&collection).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the vector store");
            false
        }
    };

    let (status_code, status) = if store_reachable {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.start_time.elapsed().as_secs(),
            collection,
            store_reachable,
        }),
    )
}

/// `GET /metrics`
pub async fn metrics_endpoint(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}
