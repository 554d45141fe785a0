use std::collections::BTreeMap;

use crate::document::Document;
use crate::index::CorpusIndex;
use crate::ranking::RankingError;
use crate::types::results::{Query, ScoredResult};

use super::Scorer;

/// TF-IDF weighting with cosine similarity.
///
/// weight(t, d) = (1 + log10 tf) * log10(N / df), zero when tf is zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct VectorSpaceModel;

impl VectorSpaceModel {
    pub fn tf_weight(tf: usize) -> f64 {
        if tf == 0 {
            0.0
        } else {
            1.0 + (tf as f64).log10()
        }
    }

    pub fn idf(index: &CorpusIndex, term: &str) -> f64 {
        let df = index.document_frequency(term);
        if df == 0 {
            return 0.0;
        }
        (index.len() as f64 / df as f64).log10()
    }

    pub fn term_weight(index: &CorpusIndex, doc: &Document, term: &str) -> f64 {
        Self::tf_weight(doc.term_frequency(term)) * Self::idf(index, term)
    }

    /// Euclidean norm over every term the document holds.
    pub fn document_norm(index: &CorpusIndex, doc: &Document) -> f64 {
        doc.term_counts()
            .map(|(term, tf)| {
                let w = Self::tf_weight(tf) * Self::idf(index, term);
                w * w
            })
            .sum::<f64>()
            .sqrt()
    }

    fn query_weights<'q>(index: &CorpusIndex, query: &'q Query) -> BTreeMap<&'q str, f64> {
        let mut counts: BTreeMap<&'q str, usize> = BTreeMap::new();
        for term in &query.terms {
            *counts.entry(term.as_str()).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .map(|(term, tf)| (term, Self::tf_weight(tf) * Self::idf(index, term)))
            .collect()
    }
}

impl Scorer for VectorSpaceModel {
    fn name(&self) -> &'static str {
        "Vector Space (TF-IDF)"
    }

    fn score(&self, index: &CorpusIndex, query: &Query) -> Result<Vec<ScoredResult>, RankingError> {
        let query_weights = Self::query_weights(index, query);
        let query_norm = query_weights.values().map(|w| w * w).sum::<f64>().sqrt();

        let scores = index
            .documents()
            .iter()
            .map(|doc| {
                let doc_norm = Self::document_norm(index, doc);
                let score = if query_norm == 0.0 || doc_norm == 0.0 {
                    0.0
                } else {
                    let dot: f64 = query_weights
                        .iter()
                        .map(|(term, qw)| qw * Self::term_weight(index, doc, term))
                        .sum();
                    dot / (query_norm * doc_norm)
                };
                ScoredResult::new(doc.id.clone(), score)
            })
            .collect();

        Ok(scores)
    }
}
