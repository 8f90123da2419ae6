//! Reciprocal Rank Fusion of dense and sparse candidate lists.
//!
//! score(d) = sum over lists containing d of `1 / (RRF_K + position)`,
//! where `position` is the 0-based rank of `d` in that list.

use crate::config;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Fuses two ranked lists of `(id, score)` pairs and keeps the top `k`.
///
/// Only list order matters; the input scores are ignored. Equal fused scores
/// keep first-seen order: dense list order first, then new ids from the
/// sparse list.
pub fn rrf_fusion(
    dense_results: &[(u32, f32)],
    sparse_results: &[(u32, f32)],
    k: usize,
) -> Vec<(u32, f32)> {
    let rrf_k = config::RRF_K;
    let capacity = dense_results.len() + sparse_results.len();
    let mut scores: HashMap<u32, f32> = HashMap::with_capacity(capacity);
    let mut first_seen: Vec<u32> = Vec::with_capacity(capacity);

    for list in [dense_results, sparse_results] {
        for (position, (id, _)) in list.iter().enumerate() {
            let contribution = 1.0 / (rrf_k + position as f32);
            match scores.entry(*id) {
                Entry::Occupied(mut e) => *e.get_mut() += contribution,
                Entry::Vacant(e) => {
                    e.insert(contribution);
                    first_seen.push(*id);
                }
            }
        }
    }

    let mut results: Vec<(u32, f32)> = first_seen
        .into_iter()
        .map(|id| (id, scores[&id]))
        .collect();
    // Stable sort: ties stay in first-seen order.
    results.sort_by(|a, b| b.1.total_cmp(&a.1));
    results.truncate(k);
    results
}
