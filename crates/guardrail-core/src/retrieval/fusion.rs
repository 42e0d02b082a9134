//! Reciprocal Rank Fusion.
//!
//! A document at 1-based rank `r` in a ranking contributes `1 / (k + r)`;
//! documents absent from a ranking contribute nothing for it.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Standard RRF damping constant.
pub const RRF_K: f64 = 60.0;

/// Sum reciprocal-rank contributions per document index.
pub fn rrf_fuse(rankings: &[Vec<usize>], k: f64) -> BTreeMap<usize, f64> {
    let mut fused = BTreeMap::new();
    for ranking in rankings {
        for (position, &doc) in ranking.iter().enumerate() {
            let rank = (position + 1) as f64;
            *fused.entry(doc).or_insert(0.0) += 1.0 / (k + rank);
        }
    }
    fused
}

/// Fused ordering: descending fused score, ties by index ascending.
pub fn fused_order(rankings: &[Vec<usize>], k: f64) -> Vec<usize> {
    let mut scored: Vec<(usize, f64)> = rrf_fuse(rankings, k).into_iter().collect();
    // BTreeMap iteration is index-ascending, and the sort is stable
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(doc, _)| doc).collect()
}
