//! Okapi BM25 over a small, request-scoped corpus.

use std::collections::BTreeMap;

/// Term-frequency saturation.
pub const K1: f64 = 1.5;

/// Length normalization.
pub const B: f64 = 0.75;

/// Floor for negative IDFs, as a fraction of the average IDF.
pub const EPSILON: f64 = 0.25;

/// A BM25 index over pre-tokenized documents.
#[derive(Debug, Clone)]
pub struct Bm25 {
    k1: f64,
    b: f64,
    doc_freqs: Vec<BTreeMap<String, usize>>,
    doc_lens: Vec<usize>,
    avgdl: f64,
    idf: BTreeMap<String, f64>,
}

impl Bm25 {
    /// Index a tokenized corpus with the default parameters.
    pub fn new(corpus: &[Vec<String>]) -> Self {
        Self::with_params(corpus, K1, B, EPSILON)
    }

    /// Index a tokenized corpus with explicit parameters.
    pub fn with_params(corpus: &[Vec<String>], k1: f64, b: f64, epsilon: f64) -> Self {
        let mut doc_freqs = Vec::with_capacity(corpus.len());
        let mut doc_lens = Vec::with_capacity(corpus.len());
        // number of documents containing each term
        let mut containing: BTreeMap<String, usize> = BTreeMap::new();

        for doc in corpus {
            let mut freqs: BTreeMap<String, usize> = BTreeMap::new();
            for term in doc {
                *freqs.entry(term.clone()).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *containing.entry(term.clone()).or_insert(0) += 1;
            }
            doc_lens.push(doc.len());
            doc_freqs.push(freqs);
        }

        let total_len: usize = doc_lens.iter().sum();
        let avgdl = if corpus.is_empty() {
            0.0
        } else {
            total_len as f64 / corpus.len() as f64
        };

        let n = corpus.len() as f64;
        let mut idf = BTreeMap::new();
        let mut idf_sum = 0.0;
        let mut negative = Vec::new();
        for (term, df) in &containing {
            let df = *df as f64;
            let value = (n - df + 0.5).ln() - (df + 0.5).ln();
            idf_sum += value;
            if value < 0.0 {
                negative.push(term.clone());
            }
            idf.insert(term.clone(), value);
        }

        let average_idf = if idf.is_empty() {
            0.0
        } else {
            idf_sum / idf.len() as f64
        };
        let floor = epsilon * average_idf;
        for term in negative {
            idf.insert(term, floor);
        }

        Self {
            k1,
            b,
            doc_freqs,
            doc_lens,
            avgdl,
            idf,
        }
    }

    /// Score every document against the query tokens, in corpus order.
    pub fn scores(&self, query: &[String]) -> Vec<f64> {
        self.doc_freqs
            .iter()
            .zip(&self.doc_lens)
            .map(|(freqs, &len)| {
                let length_ratio = if self.avgdl > 0.0 {
                    len as f64 / self.avgdl
                } else {
                    0.0
                };
                let norm = self.k1 * (1.0 - self.b + self.b * length_ratio);

                query
                    .iter()
                    .map(|term| {
                        let tf = freqs.get(term).copied().unwrap_or(0) as f64;
                        if tf == 0.0 {
                            return 0.0;
                        }
                        let idf = self.idf.get(term).copied().unwrap_or(0.0);
                        idf * (tf * (self.k1 + 1.0)) / (tf + norm)
                    })
                    .sum()
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.doc_lens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_lens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tokens;

    fn corpus(docs: &[&str]) -> Vec<Vec<String>> {
        docs.iter().map(|d| tokens(d)).collect()
    }

    #[test]
    fn test_rare_term_scores_highest() {
        let index = Bm25::new(&corpus(&[
            "the cat sat on the mat",
            "the dog chased the ball",
            "a bird sang in the tree",
        ]));
        let scores = index.scores(&tokens("dog"));
        assert!(scores[1] > scores[0]);
        assert!(scores[1] > scores[2]);
        assert_eq!(scores[0], 0.0);
    }

    #[test]
    fn test_negative_idf_is_floored() {
        // "the" appears in every document, so its raw IDF is negative
        let index = Bm25::new(&corpus(&["the cat", "the dog", "the bird"]));
        let common = 0.5f64.ln() - 3.5f64.ln();
        let rare = 2.5f64.ln() - 1.5f64.ln();
        let raw_average = (common + 3.0 * rare) / 4.0;
        assert!((index.idf["cat"] - rare).abs() < 1e-12);
        assert!((index.idf["the"] - EPSILON * raw_average).abs() < 1e-12);
    }

    #[test]
    fn test_empty_corpus() {
        let index = Bm25::new(&[]);
        assert!(index.is_empty());
        assert!(index.scores(&tokens("anything")).is_empty());
    }

    #[test]
    fn test_empty_documents_do_not_divide_by_zero() {
        let index = Bm25::new(&corpus(&["", ""]));
        let scores = index.scores(&tokens("query"));
        assert_eq!(scores, vec![0.0, 0.0]);
    }
}
