use crate::index::CorpusIndex;
use crate::ranking::RankingError;
use crate::types::results::{Query, ScoredResult};

use super::Scorer;

/// Okapi BM25 with the non-negative smoothed IDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Model {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Model {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

impl Bm25Model {
    pub fn new(k1: f64, b: f64) -> Self {
        Self { k1, b }
    }

    /// ln(1 + (N - df + 0.5) / (df + 0.5)); never negative.
    pub fn idf(index: &CorpusIndex, term: &str) -> f64 {
        let n = index.len() as f64;
        let df = index.document_frequency(term) as f64;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    fn term_score(&self, idf: f64, tf: usize, doc_len: usize, avgdl: f64) -> f64 {
        let tf = tf as f64;
        let length_norm = if avgdl > 0.0 {
            1.0 - self.b + self.b * (doc_len as f64 / avgdl)
        } else {
            1.0
        };
        idf * (tf * (self.k1 + 1.0)) / (tf + self.k1 * length_norm)
    }
}

impl Scorer for Bm25Model {
    fn name(&self) -> &'static str {
        "Probabilistic (BM25)"
    }

    fn score(&self, index: &CorpusIndex, query: &Query) -> Result<Vec<ScoredResult>, RankingError> {
        let avgdl = index.average_document_length();

        // Terms absent from the corpus contribute nothing.
        let known: Vec<(&str, f64)> = query
            .terms
            .iter()
            .filter(|t| index.in_vocabulary(t))
            .map(|t| (t.as_str(), Self::idf(index, t)))
            .collect();

        let scores = index
            .documents()
            .iter()
            .map(|doc| {
                let score = known
                    .iter()
                    .map(|(term, idf)| {
                        self.term_score(*idf, doc.term_frequency(term), doc.len(), avgdl)
                    })
                    .sum();
                ScoredResult::new(doc.id.clone(), score)
            })
            .collect();

        Ok(scores)
    }
}
