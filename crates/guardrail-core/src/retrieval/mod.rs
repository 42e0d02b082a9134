//! Lexical ranking over the request's passages.
//!
//! Two independent rankings, BM25 relevance and TF-IDF cosine similarity,
//! are fused with Reciprocal Rank Fusion. Every ranking is stable: equal
//! scores keep the original passage order.

mod bm25;
mod fusion;
mod tfidf;

pub use bm25::Bm25;
pub use fusion::{fused_order, rrf_fuse, RRF_K};
pub use tfidf::TfIdf;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::text::tokens;
use crate::types::Passage;

/// Which ranking the retriever uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum RetrieverMode {
    /// BM25 and TF-IDF fused with RRF
    #[default]
    Hybrid,
    Bm25,
    Tfidf,
}

impl From<&str> for RetrieverMode {
    /// Unknown modes fall back to `Hybrid`.
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "bm25" => RetrieverMode::Bm25,
            "tfidf" => RetrieverMode::Tfidf,
            _ => RetrieverMode::Hybrid,
        }
    }
}

impl From<Option<String>> for RetrieverMode {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(RetrieverMode::from).unwrap_or_default()
    }
}

impl fmt::Display for RetrieverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RetrieverMode::Hybrid => "hybrid",
            RetrieverMode::Bm25 => "bm25",
            RetrieverMode::Tfidf => "tfidf",
        })
    }
}

/// A request-scoped index over an ordered passage list.
///
/// Built once per evaluation so coverage and repair can issue many queries
/// without re-tokenizing the passages.
#[derive(Debug, Clone)]
pub struct LexicalRanker {
    bm25: Bm25,
    tfidf: TfIdf,
}

impl LexicalRanker {
    pub fn new(passages: &[Passage]) -> Self {
        let corpus: Vec<Vec<String>> = passages.iter().map(|p| tokens(&p.text)).collect();
        Self {
            bm25: Bm25::new(&corpus),
            tfidf: TfIdf::new(&corpus),
        }
    }

    pub fn len(&self) -> usize {
        self.bm25.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bm25.is_empty()
    }

    /// All passage indices ordered by BM25 score.
    pub fn bm25_ranking(&self, query: &str) -> Vec<usize> {
        rank_by_scores(&self.bm25.scores(&tokens(query)))
    }

    /// All passage indices ordered by TF-IDF similarity.
    pub fn tfidf_ranking(&self, query: &str) -> Vec<usize> {
        rank_by_scores(&self.tfidf.similarities(&tokens(query)))
    }

    /// All passage indices ordered by fused BM25 + TF-IDF rank.
    pub fn fused_ranking(&self, query: &str) -> Vec<usize> {
        if self.is_empty() {
            return Vec::new();
        }
        fused_order(&[self.bm25_ranking(query), self.tfidf_ranking(query)], RRF_K)
    }

    /// The `top_k` best passage indices for `query` under `mode`.
    pub fn top_ids(&self, query: &str, mode: RetrieverMode, top_k: usize) -> Vec<usize> {
        let mut ranking = match mode {
            RetrieverMode::Hybrid => self.fused_ranking(query),
            RetrieverMode::Bm25 => self.bm25_ranking(query),
            RetrieverMode::Tfidf => self.tfidf_ranking(query),
        };
        ranking.truncate(top_k);
        ranking
    }
}

/// Indices sorted by descending score; the stable sort keeps ties in index order.
fn rank_by_scores(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}

/// Hybrid top-`top_k` passage indices for a one-off query.
pub fn fused_rank(query: &str, passages: &[Passage], top_k: usize) -> Vec<usize> {
    top_ids(query, passages, RetrieverMode::Hybrid, top_k)
}

/// Top-`top_k` passage indices for a one-off query under `mode`.
pub fn top_ids(query: &str, passages: &[Passage], mode: RetrieverMode, top_k: usize) -> Vec<usize> {
    if passages.is_empty() {
        return Vec::new();
    }
    LexicalRanker::new(passages).top_ids(query, mode, top_k)
}

/// Select passages by index, skipping indices out of range.
pub fn pick_passages<'a>(passages: &'a [Passage], ids: &[usize]) -> Vec<&'a Passage> {
    ids.iter().filter_map(|&i| passages.get(i)).collect()
}
