//! TF-IDF vectors with cosine similarity.
//!
//! Raw term counts weighted by smoothed IDF, rows L2-normalized. The
//! vocabulary comes from the passages only; query terms outside it are ignored.

use std::collections::BTreeMap;

type SparseVector = BTreeMap<String, f64>;

/// A TF-IDF index over pre-tokenized documents.
#[derive(Debug, Clone)]
pub struct TfIdf {
    idf: BTreeMap<String, f64>,
    rows: Vec<SparseVector>,
}

impl TfIdf {
    pub fn new(corpus: &[Vec<String>]) -> Self {
        let n = corpus.len() as f64;
        let mut df: BTreeMap<String, usize> = BTreeMap::new();
        for doc in corpus {
            let mut seen: Vec<&String> = doc.iter().collect();
            seen.sort();
            seen.dedup();
            for term in seen {
                *df.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let idf: BTreeMap<String, f64> = df
            .into_iter()
            .map(|(term, count)| {
                let value = ((1.0 + n) / (1.0 + count as f64)).ln() + 1.0;
                (term, value)
            })
            .collect();

        let mut index = Self {
            idf,
            rows: Vec::with_capacity(corpus.len()),
        };
        let rows = corpus.iter().map(|doc| index.vectorize(doc)).collect();
        index.rows = rows;
        index
    }

    /// Project tokens onto the vocabulary as an L2-normalized vector.
    fn vectorize(&self, tokens: &[String]) -> SparseVector {
        let mut vector = SparseVector::new();
        for term in tokens {
            if let Some(idf) = self.idf.get(term) {
                *vector.entry(term.clone()).or_insert(0.0) += idf;
            }
        }

        let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for weight in vector.values_mut() {
                *weight /= norm;
            }
        }
        vector
    }

    /// Cosine similarity of the query against every document, in corpus order.
    pub fn similarities(&self, query: &[String]) -> Vec<f64> {
        let q = self.vectorize(query);
        self.rows
            .iter()
            .map(|row| {
                q.iter()
                    .filter_map(|(term, weight)| row.get(term).map(|w| w * weight))
                    .sum()
            })
            .collect()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }
}
