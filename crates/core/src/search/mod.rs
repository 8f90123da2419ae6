//! Search primitives: scored points, payload filtering, and rank fusion.

/// Payload filter evaluation.
pub mod filter;
/// Reciprocal Rank Fusion of dense and sparse candidate lists.
pub mod hybrid;
/// Hybrid query and scored point types.
pub mod types;

pub use types::{HybridQuery, ScoredPoint};
