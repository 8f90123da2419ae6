//! Model-free embedder based on token hashing.
//!
//! Texts sharing a token share a dense bucket and a sparse index, so lexical
//! overlap shows up in both spaces. Output is deterministic across runs.

use super::Embedder;
use crate::error::Result;
use crate::vector::SparseVector;
use std::collections::BTreeMap;

/// Size of the sparse vocabulary (matches the BERT WordPiece vocabulary).
const SPARSE_VOCAB_SIZE: u64 = 30_522;

/// Deterministic token-hashing embedder.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn dense_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimension];
        for token in tokens(text) {
            v[(fnv1a(&token) % self.dimension as u64) as usize] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }

    fn sparse_one(&self, text: &str) -> SparseVector {
        let mut weights: BTreeMap<u32, f32> = BTreeMap::new();
        for token in tokens(text) {
            *weights
                .entry((fnv1a(&token) % SPARSE_VOCAB_SIZE) as u32)
                .or_insert(0.0) += 1.0;
        }
        let (indices, values) = weights.into_iter().unzip();
        SparseVector::new(indices, values)
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(crate::config::DENSE_DIMENSION)
    }
}

impl Embedder for HashingEmbedder {
    fn dense_model(&self) -> &str {
        "hashing-dense"
    }

    fn sparse_model(&self) -> &str {
        "hashing-sparse"
    }

    fn dense_dimension(&self) -> usize {
        self.dimension
    }

    fn embed_dense(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.dense_one(t)).collect())
    }

    fn embed_sparse(&self, texts: &[String]) -> Result<Vec<SparseVector>> {
        Ok(texts.iter().map(|t| self.sparse_one(t)).collect())
    }
}

/// Lowercased alphanumeric tokens.
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn fnv1a(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in s.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::cosine_similarity;

    fn embed_one(e: &HashingEmbedder, text: &str) -> crate::vector::NamedVectors {
        e.embed(&[text.to_string()]).unwrap().remove(0)
    }

    #[test]
    fn shared_token_overlaps_in_both_spaces() {
        let e = HashingEmbedder::default();
        let doc = embed_one(&e, "AI startup in Berlin");
        let query = embed_one(&e, "AI");
        assert!(query.sparse.dot(&doc.sparse).is_some());
        assert!(cosine_similarity(&query.dense, &doc.dense) > 0.0);
    }

    #[test]
    fn case_and_punctuation_are_ignored() {
        let e = HashingEmbedder::new(16);
        assert_eq!(embed_one(&e, "Hello, World!"), embed_one(&e, "hello world"));
    }

    #[test]
    fn sparse_indices_are_unique_and_counted() {
        let e = HashingEmbedder::new(8);
        let v = embed_one(&e, "data data data");
        assert_eq!(v.sparse.indices.len(), 1);
        assert_eq!(v.sparse.values, vec![3.0]);
    }

    #[test]
    fn empty_text_gives_zero_vectors() {
        let e = HashingEmbedder::new(4);
        let v = embed_one(&e, "   ");
        assert_eq!(v.dense, vec![0.0; 4]);
        assert!(v.sparse.is_empty());
    }
}
