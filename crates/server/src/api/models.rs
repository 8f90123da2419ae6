//! Request and response data transfer objects for the REST API.

use hybridsearch_core::config;
use serde::{Deserialize, Serialize};

fn default_limit() -> usize {
    config::DEFAULT_LIMIT
}

fn default_score_threshold() -> f32 {
    config::DEFAULT_SCORE_THRESHOLD
}

/// Query string of `GET /api/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,
}

/// Query string of `GET /api/search_city`.
#[derive(Debug, Deserialize)]
pub struct SearchCityParams {
    pub query: String,
    pub city: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub collection: String,
    pub store_reachable: bool,
}
