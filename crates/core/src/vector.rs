//! Dense and sparse vector types and the collection schema that names them.

use crate::config;
use crate::document::Payload;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Similarity metric of the dense vector space.
///
/// Serialized with Qdrant's spelling (`"Cosine"`, `"Euclid"`, `"Dot"`, `"Manhattan"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    Cosine,
    #[serde(rename = "Euclid")]
    Euclidean,
    #[serde(rename = "Dot")]
    DotProduct,
    Manhattan,
}

impl Distance {
    /// Similarity between two dense vectors (higher = more similar).
    pub fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Distance::Cosine => cosine_similarity(a, b),
            Distance::DotProduct => dot_product(a, b),
            Distance::Euclidean => {
                let sq: f32 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
                -sq.sqrt()
            }
            Distance::Manhattan => -a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum::<f32>(),
        }
    }
}

/// Weighted term set over a model vocabulary.
///
/// `indices[i]` carries weight `values[i]`. Indices are unique within a vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<u32>,
    pub values: Vec<f32>,
}

impl SparseVector {
    pub fn new(indices: Vec<u32>, values: Vec<f32>) -> Self {
        Self { indices, values }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Checks that both arrays have the same length and all weights are finite.
    pub fn validate(&self) -> Result<(), String> {
        if self.indices.len() != self.values.len() {
            return Err(format!(
                "sparse vector has {} indices but {} values",
                self.indices.len(),
                self.values.len()
            ));
        }
        if self.values.iter().any(|v| !v.is_finite()) {
            return Err("sparse vector contains NaN or Inf".into());
        }
        Ok(())
    }

    /// Dot product over shared indices. `None` when no index overlaps.
    pub fn dot(&self, other: &SparseVector) -> Option<f32> {
        let (small, large) = if self.indices.len() <= other.indices.len() {
            (self, other)
        } else {
            (other, self)
        };
        let lookup: std::collections::HashMap<u32, f32> = large
            .indices
            .iter()
            .copied()
            .zip(large.values.iter().copied())
            .collect();
        let mut overlap = false;
        let mut sum = 0.0;
        for (idx, v) in small.indices.iter().zip(&small.values) {
            if let Some(w) = lookup.get(idx) {
                overlap = true;
                sum += v * w;
            }
        }
        overlap.then_some(sum)
    }
}

/// The pair of vectors every point carries.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedVectors {
    pub dense: Vec<f32>,
    pub sparse: SparseVector,
}

/// Vector layout of a collection, fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSchema {
    pub dense_name: String,
    pub dense_size: usize,
    pub distance: Distance,
    pub sparse_name: String,
}

impl CollectionSchema {
    /// Schema for a dense space of `dense_size` dimensions under the default names.
    pub fn new(dense_size: usize) -> Self {
        Self {
            dense_name: config::DENSE_VECTOR_NAME.to_string(),
            dense_size,
            distance: Distance::Cosine,
            sparse_name: config::SPARSE_VECTOR_NAME.to_string(),
        }
    }
}

impl Default for CollectionSchema {
    fn default() -> Self {
        Self::new(config::DENSE_DIMENSION)
    }
}

impl fmt::Display for CollectionSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}; {:?}] + {}[sparse]",
            self.dense_name, self.dense_size, self.distance, self.sparse_name
        )
    }
}

/// A point ready to be written: identity, vectors, and payload.
#[derive(Debug, Clone)]
pub struct PointStruct {
    pub id: Uuid,
    pub vectors: NamedVectors,
    pub payload: Payload,
}

impl PointStruct {
    /// Creates a point with a random UUID.
    pub fn new(vectors: NamedVectors, payload: Payload) -> Self {
        Self {
            id: Uuid::new_v4(),
            vectors,
            payload,
        }
    }
}

pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot = dot_product(a, b);
    let norm_a = dot_product(a, a).sqrt();
    let norm_b = dot_product(b, b).sqrt();
    if norm_a < f32::EPSILON || norm_b < f32::EPSILON {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
