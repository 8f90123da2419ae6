use clap::Parser;
use hybridsearch_core::config;
use hybridsearch_core::embedding::FastEmbedder;
use hybridsearch_server::loader::CorpusLoader;
use hybridsearch_server::store::QdrantStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "load-data", about = "Embed a JSON-lines corpus and upload it to Qdrant")]
struct Args {
    /// Newline-delimited JSON file, one object with a `description` per line
    #[arg(long, default_value = config::DEFAULT_CORPUS_PATH)]
    corpus: PathBuf,

    /// Qdrant REST endpoint
    #[arg(long, env = "QDRANT_URL", default_value = config::DEFAULT_QDRANT_URL)]
    qdrant_url: String,

    /// Qdrant API key
    #[arg(long, env = "QDRANT_API_KEY", hide_env_values = true)]
    qdrant_api_key: Option<String>,

    /// Collection to create and fill
    #[arg(long, env = "HYBRIDSEARCH_COLLECTION", default_value = config::DEFAULT_COLLECTION)]
    collection: String,

    /// Batches embedded and uploaded concurrently
    #[arg(long, default_value_t = config::DEFAULT_UPLOAD_PARALLELISM)]
    parallel: usize,

    /// Records per batch
    #[arg(long, default_value_t = config::DEFAULT_UPLOAD_BATCH_SIZE)]
    batch_size: usize,

    /// Directory where embedding models are cached
    #[arg(long, env = "FASTEMBED_CACHE_DIR")]
    model_cache_dir: Option<PathBuf>,
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

    if args.parallel == 0 || args.batch_size == 0 {
        eprintln!("Error: --parallel and --batch-size must be > 0");
        std::process::exit(1);
    }
    if !args.corpus.is_file() {
        eprintln!("Error: corpus '{}' is not a file", args.corpus.display());
        std::process::exit(1);
    }

    let cache_dir = args.model_cache_dir.clone();
    let batch_size = args.batch_size;
    let embedder = tokio::task::spawn_blocking(move || {
        FastEmbedder::new(cache_dir, true).map(|e| e.with_batch_size(batch_size))
    })
    .await??;
    let store = QdrantStore::new(
        &args.qdrant_url,
        args.qdrant_api_key.clone(),
        Duration::from_secs(config::STORE_TIMEOUT_SECS),
    )?;

    let loader = CorpusLoader::new(Arc::new(store), Arc::new(embedder), args.collection.clone())
        .with_parallelism(args.parallel)
        .with_batch_size(args.batch_size);

    match loader.load_file(&args.corpus).await {
        Ok(report) => {
            tracing::info!(
                corpus = %args.corpus.display(),
                collection = %args.collection,
                records = report.records,
                batches = report.batches,
                elapsed_secs = report.elapsed.as_secs_f64(),
                "Corpus uploaded"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Load failed");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
