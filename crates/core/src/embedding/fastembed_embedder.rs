//! Local ONNX embedding via fastembed.
//!
//! Loads `all-MiniLM-L6-v2` for the dense space and SPLADE++ for the sparse
//! space. Models are downloaded into the cache directory on first use.

use super::Embedder;
use crate::config;
use crate::error::{Error, Result};
use crate::vector::SparseVector;
use ::fastembed::{
    EmbeddingModel, InitOptions, SparseInitOptions, SparseModel, SparseTextEmbedding,
    TextEmbedding,
};
use std::path::PathBuf;

/// [`Embedder`] backed by two fastembed models.
pub struct FastEmbedder {
    dense: TextEmbedding,
    sparse: SparseTextEmbedding,
    batch_size: Option<usize>,
}

impl FastEmbedder {
    /// Loads both models, downloading them into `cache_dir` if needed.
    pub fn new(cache_dir: Option<PathBuf>, show_download_progress: bool) -> Result<Self> {
        let mut dense_options = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_show_download_progress(show_download_progress);
        let mut sparse_options = SparseInitOptions::new(SparseModel::SPLADEPPV1)
            .with_show_download_progress(show_download_progress);
        if let Some(dir) = cache_dir {
            dense_options = dense_options.with_cache_dir(dir.clone());
            sparse_options = sparse_options.with_cache_dir(dir);
        }

        let dense = TextEmbedding::try_new(dense_options).map_err(|e| {
            Error::Embedding(format!("failed to load {}: {}", config::DENSE_MODEL, e))
        })?;
        let sparse = SparseTextEmbedding::try_new(sparse_options).map_err(|e| {
            Error::Embedding(format!("failed to load {}: {}", config::SPARSE_MODEL, e))
        })?;
        tracing::info!(
            dense_model = config::DENSE_MODEL,
            sparse_model = config::SPARSE_MODEL,
            "Embedding models loaded"
        );

        Ok(Self {
            dense,
            sparse,
            batch_size: None,
        })
    }

    /// Overrides fastembed's internal inference batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
}

impl Embedder for FastEmbedder {
    fn dense_model(&self) -> &str {
        config::DENSE_MODEL
    }

    fn sparse_model(&self) -> &str {
        config::SPARSE_MODEL
    }

    fn dense_dimension(&self) -> usize {
        config::DENSE_DIMENSION
    }

    fn embed_dense(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.dense
            .embed(texts.to_vec(), self.batch_size)
            .map_err(|e| Error::Embedding(e.to_string()))
    }

    fn embed_sparse(&self, texts: &[String]) -> Result<Vec<SparseVector>> {
        let embeddings = self
            .sparse
            .embed(texts.to_vec(), self.batch_size)
            .map_err(|e| Error::Embedding(e.to_string()))?;
        Ok(embeddings
            .into_iter()
            .map(|e| {
                SparseVector::new(
                    e.indices.into_iter().map(|i| i as u32).collect(),
                    e.values,
                )
            })
            .collect())
    }
}
