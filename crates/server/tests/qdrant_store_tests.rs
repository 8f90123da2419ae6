//! `QdrantStore` against an in-process fake of the Qdrant REST API.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use hybridsearch_core::filter_types::FilterClause;
use hybridsearch_core::search::HybridQuery;
use hybridsearch_core::vector::{CollectionSchema, NamedVectors, PointStruct, SparseVector};
use hybridsearch_core::Error;
use hybridsearch_server::store::{QdrantStore, VectorStore};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Recorded {
    collections: HashMap<String, Value>,
    create_bodies: Vec<Value>,
    upsert_bodies: Vec<Value>,
    upsert_waits: Vec<Option<String>>,
    query_bodies: Vec<Value>,
    api_keys: Vec<Option<String>>,
}

type Shared = Arc<Mutex<Recorded>>;

fn record_key(state: &Shared, headers: &HeaderMap) {
    let key = headers
        .get("api-key")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    state.lock().unwrap().api_keys.push(key);
}

async fn exists(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Json<Value> {
    record_key(&state, &headers);
    let exists = state.lock().unwrap().collections.contains_key(&name);
    Json(json!({"result": {"exists": exists}, "status": "ok", "time": 0.0}))
}

async fn info(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> (StatusCode, Json<Value>) {
    record_key(&state, &headers);
    match state.lock().unwrap().collections.get(&name) {
        Some(params) => (
            StatusCode::OK,
            Json(json!({
                "result": {"status": "green", "config": {"params": params}},
                "status": "ok"
            })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": {"error": format!("Collection `{}` doesn't exist!", name)}})),
        ),
    }
}

async fn create(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record_key(&state, &headers);
    let mut recorded = state.lock().unwrap();
    recorded.create_bodies.push(body.clone());
    if recorded.collections.contains_key(&name) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"status": {"error": format!("Wrong input: Collection `{}` already exists!", name)}})),
        );
    }
    recorded.collections.insert(name, body);
    (StatusCode::OK, Json(json!({"result": true, "status": "ok"})))
}

async fn upsert(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    record_key(&state, &headers);
    let mut recorded = state.lock().unwrap();
    recorded.upsert_waits.push(params.get("wait").cloned());
    recorded.upsert_bodies.push(body);
    Json(json!({"result": {"operation_id": 1, "status": "completed"}, "status": "ok"}))
}

async fn query(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record_key(&state, &headers);
    state.lock().unwrap().query_bodies.push(body);
    Json(json!({
        "result": {"points": [
            {
                "id": "6f1c2c4e-1b7a-4a53-9d2b-0b3a7b9e1c11",
                "version": 3,
                "score": 1.0,
                "payload": {"name": "Acme", "city": "Berlin", "description": "AI startup in Berlin"}
            },
            {"id": 42, "version": 3, "score": 0.75}
        ]},
        "status": "ok"
    }))
}

async fn failing_query() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"status": {"error": "Service internal error: index corrupted"}})),
    )
}

async fn spawn_fake_qdrant(query_fails: bool) -> (String, Shared) {
    let state: Shared = Arc::default();
    let query_route = if query_fails {
        post(failing_query)
    } else {
        post(query)
    };
    let app = Router::new()
        .route("/collections/:name/exists", get(exists))
        .route("/collections/:name", get(info).put(create))
        .route("/collections/:name/points", put(upsert))
        .route("/collections/:name/points/query", query_route)
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), state)
}

fn store(base_url: &str, api_key: Option<&str>) -> QdrantStore {
    QdrantStore::new(base_url, api_key.map(String::from), Duration::from_secs(5)).unwrap()
}

fn sample_query(filter: Option<FilterClause>) -> HybridQuery {
    HybridQuery {
        dense: vec![0.1, 0.2, 0.3],
        sparse: SparseVector::new(vec![5, 9], vec![0.5, 1.5]),
        filter,
        prefetch_limit: 10,
        limit: 5,
        score_threshold: Some(0.7),
    }
}

#[tokio::test]
async fn test_create_collection_then_read_schema_back() {
    let (base_url, recorded) = spawn_fake_qdrant(false).await;
    let store = store(&base_url, None);

    assert!(!store.collection_exists("startups").await.unwrap());
    assert_eq!(store.collection_schema("startups").await.unwrap(), None);

    let schema = CollectionSchema::default();
    store.create_collection("startups", &schema).await.unwrap();
    assert!(store.collection_exists("startups").await.unwrap());
    assert_eq!(store.collection_schema("startups").await.unwrap(), Some(schema));

    let recorded = recorded.lock().unwrap();
    assert_eq!(
        recorded.create_bodies[0],
        json!({
            "vectors": {"dense": {"size": 384, "distance": "Cosine"}},
            "sparse_vectors": {"sparse": {}}
        })
    );
}

#[tokio::test]
async fn test_create_collection_is_idempotent() {
    let (base_url, recorded) = spawn_fake_qdrant(false).await;
    let store = store(&base_url, None);
    let schema = CollectionSchema::default();
    store.create_collection("startups", &schema).await.unwrap();
    store.create_collection("startups", &schema).await.unwrap();
    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.create_bodies.len(), 2);
    assert_eq!(recorded.collections.len(), 1);
}

#[tokio::test]
async fn test_upsert_sends_named_vectors_and_waits() {
    let (base_url, recorded) = spawn_fake_qdrant(false).await;
    let store = store(&base_url, None);
    let point = PointStruct::new(
        NamedVectors {
            dense: vec![1.0, 0.0],
            sparse: SparseVector::new(vec![3], vec![0.25]),
        },
        json!({"name": "Acme", "description": "AI startup in Berlin"})
            .as_object()
            .cloned()
            .unwrap(),
    );
    let id = point.id;
    store.upsert("startups", vec![point]).await.unwrap();

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.upsert_waits, vec![Some("true".to_string())]);
    let sent = &recorded.upsert_bodies[0]["points"][0];
    assert_eq!(sent["id"], json!(id.to_string()));
    assert_eq!(sent["vector"]["dense"], json!([1.0, 0.0]));
    assert_eq!(sent["vector"]["sparse"], json!({"indices": [3], "values": [0.25]}));
    assert_eq!(sent["payload"]["name"], "Acme");
}

#[tokio::test]
async fn test_query_body_and_results() {
    let (base_url, recorded) = spawn_fake_qdrant(false).await;
    let store = store(&base_url, None);
    let filter = FilterClause::must_match("city", "Berlin");
    let hits = store
        .query("startups", &sample_query(Some(filter)))
        .await
        .unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].payload["name"], "Acme");
    assert_eq!(hits[0].score, 1.0);
    assert!(hits[1].payload.is_empty());

    let recorded = recorded.lock().unwrap();
    let body = &recorded.query_bodies[0];
    let expected_filter = json!({"must": [{"key": "city", "match": {"value": "Berlin"}}]});
    assert_eq!(body["query"], json!({"fusion": "rrf"}));
    assert_eq!(body["filter"], expected_filter);
    assert_eq!(body["limit"], 5);
    assert_eq!(body["with_payload"], true);
    assert!((body["score_threshold"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    let prefetch = body["prefetch"].as_array().unwrap();
    assert_eq!(prefetch.len(), 2);
    assert_eq!(prefetch[0]["using"], "dense");
    assert_eq!(prefetch[1]["using"], "sparse");
    assert_eq!(prefetch[1]["query"]["indices"], json!([5, 9]));
    for p in prefetch {
        assert_eq!(p["limit"], 10);
        assert_eq!(p["filter"], expected_filter);
    }
}

#[tokio::test]
async fn test_api_key_header_is_sent() {
    let (base_url, recorded) = spawn_fake_qdrant(false).await;
    store(&base_url, Some("secret"))
        .collection_exists("startups")
        .await
        .unwrap();
    store(&base_url, None)
        .collection_exists("startups")
        .await
        .unwrap();
    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.api_keys, vec![Some("secret".to_string()), None]);
}

#[tokio::test]
async fn test_server_error_is_upstream_unavailable() {
    let (base_url, _recorded) = spawn_fake_qdrant(true).await;
    let err = store(&base_url, None)
        .query("startups", &sample_query(None))
        .await
        .unwrap_err();
    match err {
        Error::UpstreamUnavailable(msg) => assert!(msg.contains("index corrupted"), "{}", msg),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_upstream_unavailable() {
    // Bind and drop to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = store(&format!("http://{}", addr), None)
        .collection_exists("startups")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UpstreamUnavailable(_)));
}
