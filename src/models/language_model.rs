use crate::document::Document;
use crate::index::CorpusIndex;
use crate::ranking::RankingError;
use crate::types::results::{Query, ScoredResult};

use super::Scorer;

/// Query likelihood with Jelinek-Mercer smoothing.
///
/// P(t|d) = lambda * tf/|d| + (1 - lambda) * cf/|C|; the score is the sum of
/// ln P(t|d) over query terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JelinekMercerModel {
    pub lambda: f64,
}

impl Default for JelinekMercerModel {
    fn default() -> Self {
        Self { lambda: 0.5 }
    }
}

impl JelinekMercerModel {
    pub fn new(lambda: f64) -> Self {
        Self { lambda }
    }

    pub fn term_probability(&self, index: &CorpusIndex, doc: &Document, term: &str) -> f64 {
        let p_doc = if doc.is_empty() {
            0.0
        } else {
            doc.term_frequency(term) as f64 / doc.len() as f64
        };
        let p_collection = index.collection_frequency(term) as f64 / index.total_length() as f64;
        self.lambda * p_doc + (1.0 - self.lambda) * p_collection
    }
}

impl Scorer for JelinekMercerModel {
    fn name(&self) -> &'static str {
        "Language Model (Jelinek-Mercer)"
    }

    fn score(&self, index: &CorpusIndex, query: &Query) -> Result<Vec<ScoredResult>, RankingError> {
        // Out-of-vocabulary terms would give ln(0) for every document; they are
        // dropped so scores stay finite and comparable.
        let known: Vec<&str> = query
            .terms
            .iter()
            .filter(|t| index.in_vocabulary(t))
            .map(String::as_str)
            .collect();

        let scores = index
            .documents()
            .iter()
            .map(|doc| {
                let score = known
                    .iter()
                    .map(|term| self.term_probability(index, doc, term).ln())
                    .sum();
                ScoredResult::new(doc.id.clone(), score)
            })
            .collect();

        Ok(scores)
    }
}
