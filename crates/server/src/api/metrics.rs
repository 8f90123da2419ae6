//! Prometheus metrics recording.

use metrics::{counter, histogram};
use std::time::Duration;

/// Records HTTP request metrics.
pub fn record_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Records a completed hybrid search.
pub fn record_search_operation(collection: &str, search_type: &str) {
    counter!(
        "hybridsearch_search_total",
        "collection" => collection.to_string(),
        "type" => search_type.to_string()
    )
    .increment(1);
}

/// Records points written by the loader.
pub fn record_points_uploaded(collection: &str, count: usize) {
    counter!(
        "hybridsearch_points_uploaded_total",
        "collection" => collection.to_string()
    )
    .increment(count as u64);
}

/// Records one call to the vector store.
pub fn record_store_operation(operation: &str, status: &str, duration: Duration) {
    let labels = [
        ("operation", operation.to_string()),
        ("status", status.to_string()),
    ];
    histogram!("hybridsearch_store_request_duration_seconds", &labels)
        .record(duration.as_secs_f64());
}
