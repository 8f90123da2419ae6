use axum::http::HeaderValue;
use clap::Parser;
use hybridsearch_core::config;
use hybridsearch_core::embedding::{Embedder, FastEmbedder};
use hybridsearch_server::api::create_router;
use hybridsearch_server::api::handlers::AppState;
use hybridsearch_server::loader::CorpusLoader;
use hybridsearch_server::searcher::HybridSearcher;
use hybridsearch_server::store::{MemoryStore, QdrantStore, VectorStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hybridsearch-server", about = "Hybrid dense + sparse search API")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = config::DEFAULT_HOST)]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Qdrant REST endpoint
    #[arg(long, env = "QDRANT_URL", default_value = config::DEFAULT_QDRANT_URL)]
    qdrant_url: String,

    /// Qdrant API key
    #[arg(long, env = "QDRANT_API_KEY", hide_env_values = true)]
    qdrant_api_key: Option<String>,

    /// Collection to search
    #[arg(long, env = "HYBRIDSEARCH_COLLECTION", default_value = config::DEFAULT_COLLECTION)]
    collection: String,

    /// Browser origin allowed by CORS
    #[arg(long, env = "HYBRIDSEARCH_CORS_ORIGIN", default_value = config::DEFAULT_CORS_ORIGIN)]
    cors_origin: String,

    /// Directory where embedding models are cached
    #[arg(long, env = "FASTEMBED_CACHE_DIR")]
    model_cache_dir: Option<PathBuf>,

    /// Serve from an in-process store loaded from this corpus instead of Qdrant
    #[arg(long)]
    memory_corpus: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("hybridsearch_server=info".parse()?)
                .add_directive("hybridsearch_core=info".parse()?),
        )
        .init();

    let args = Args::parse();

    if args.port == 0 {
        eprintln!("Error: port must be > 0");
        std::process::exit(1);
    }
    let cors_origin = match HeaderValue::from_str(&args.cors_origin) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error: invalid CORS origin '{}': {}", args.cors_origin, e);
            std::process::exit(1);
        }
    };

    let prometheus_handle =
        metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    tracing::info!("Loading embedding models...");
    let cache_dir = args.model_cache_dir.clone();
    let embedder = tokio::task::spawn_blocking(move || FastEmbedder::new(cache_dir, false)).await??;
    tracing::info!(
        dense = embedder.dense_model(),
        sparse = embedder.sparse_model(),
        "Embedding models ready"
    );
    let expected_schema = embedder.schema();

    let embedder: Arc<dyn Embedder> = Arc::new(embedder);

    let store: Arc<dyn VectorStore> = match &args.memory_corpus {
        Some(corpus) => {
            let store = Arc::new(MemoryStore::new());
            let report = CorpusLoader::new(store.clone(), embedder.clone(), args.collection.clone())
                .load_file(corpus)
                .await?;
            tracing::info!(
                corpus = %corpus.display(),
                records = report.records,
                "Serving from in-memory store"
            );
            store
        }
        None => Arc::new(QdrantStore::new(
            &args.qdrant_url,
            args.qdrant_api_key.clone(),
            Duration::from_secs(config::STORE_TIMEOUT_SECS),
        )?),
    };

    // The server never creates the collection; a bad layout is only reported.
    match store.collection_schema(&args.collection).await {
        Ok(Some(found)) if found != expected_schema => {
            let err = hybridsearch_core::Error::CollectionConfigMismatch {
                name: args.collection.clone(),
                expected: expected_schema.to_string(),
                found: found.to_string(),
            };
            tracing::warn!(error = %err, "Searches may fail");
        }
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!(collection = %args.collection, "Collection does not exist yet, run load-data first");
        }
        Err(e) => tracing::warn!(error = %e, "Could not inspect collection at startup"),
    }

    let searcher = HybridSearcher::new(store, embedder, args.collection.clone());
    let state = AppState {
        searcher,
        prometheus_handle,
        start_time: Instant::now(),
    };

    let app = create_router(state, cors_origin);
    let addr = format!("{}:{}", args.host, args.port);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %addr,
        qdrant_url = %args.qdrant_url,
        in_memory = args.memory_corpus.is_some(),
        collection = %args.collection,
        cors_origin = %args.cors_origin,
        "hybridsearch ready"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_signal())
        .await?;

    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }

    tracing::info!("Shutting down gracefully, draining in-flight requests...");
}
