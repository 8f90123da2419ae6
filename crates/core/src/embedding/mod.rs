//! Embedding providers.
//!
//! An [`Embedder`] turns text into the two representations every point
//! carries: a dense vector from one named model and a sparse vector from a
//! second named model. Providers are synchronous and CPU-bound; async callers
//! run them on a blocking thread pool.

#[cfg(feature = "fastembed")]
mod fastembed_embedder;
mod hashing;

#[cfg(feature = "fastembed")]
pub use fastembed_embedder::FastEmbedder;
pub use hashing::HashingEmbedder;

use crate::error::{Error, Result};
use crate::vector::{CollectionSchema, NamedVectors, SparseVector};

/// Dense + sparse text embedding provider.
///
/// Implementations must be `Send + Sync`: one instance is shared by every
/// request handler and every loader batch.
pub trait Embedder: Send + Sync {
    /// Name of the dense model.
    fn dense_model(&self) -> &str;

    /// Name of the sparse model.
    fn sparse_model(&self) -> &str;

    /// Length of every vector returned by [`embed_dense`](Embedder::embed_dense).
    fn dense_dimension(&self) -> usize;

    /// Embeds each text with the dense model, in input order.
    fn embed_dense(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embeds each text with the sparse model, in input order.
    fn embed_sparse(&self, texts: &[String]) -> Result<Vec<SparseVector>>;

    /// Embeds each text with both models and pairs the results.
    ///
    /// Fails if a model returns the wrong number of vectors, a dense vector of
    /// the wrong length, or a malformed sparse vector.
    fn embed(&self, texts: &[String]) -> Result<Vec<NamedVectors>> {
        let dense = self.embed_dense(texts)?;
        let sparse = self.embed_sparse(texts)?;
        if dense.len() != texts.len() || sparse.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "expected {} embeddings, got {} dense and {} sparse",
                texts.len(),
                dense.len(),
                sparse.len()
            )));
        }
        let dimension = self.dense_dimension();
        dense
            .into_iter()
            .zip(sparse)
            .map(|(dense, sparse)| {
                if dense.len() != dimension {
                    return Err(Error::Embedding(format!(
                        "expected dense dimension {}, got {}",
                        dimension,
                        dense.len()
                    )));
                }
                sparse.validate().map_err(Error::Embedding)?;
                Ok(NamedVectors { dense, sparse })
            })
            .collect()
    }

    /// Collection schema matching this provider's output.
    fn schema(&self) -> CollectionSchema {
        CollectionSchema::new(self.dense_dimension())
    }
}
