//! Normalized Discounted Cumulative Gain.
//!
//! ```text
//! DCG@k  = Σ (2^rel_i - 1) / log₂(i + 1)   for i in 1..=k
//! IDCG@k = DCG@k of every corpus document sorted by judged grade
//! nDCG@k = DCG@k / IDCG@k, or 0 when IDCG@k is 0
//! ```
//!
//! The ideal ranking comes from the judgments over the whole corpus, not from
//! the documents a model returned, so a model that never surfaces a relevant
//! document cannot reach 1.

use serde::{Deserialize, Serialize};

use crate::index::CorpusIndex;
use crate::types::results::ScoredResult;

use super::judgments::{JudgmentVector, RelevanceGrade};
use super::EvaluationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NdcgScore {
    pub k: usize,
    pub dcg: f64,
    pub idcg: f64,
    pub ndcg: f64,
}

/// Exponential gain: 0 -> 0, 1 -> 1, 2 -> 3.
#[inline]
pub fn gain(grade: RelevanceGrade) -> f64 {
    (1u32 << grade.value()) as f64 - 1.0
}

/// Logarithmic discount for a 1-indexed position.
#[inline]
pub fn discount(position: usize) -> f64 {
    (position as f64 + 1.0).log2()
}

/// DCG over the first `k` grades of a ranking.
pub fn dcg_at_k<I>(grades: I, k: usize) -> f64
where
    I: IntoIterator<Item = RelevanceGrade>,
{
    grades
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(i, grade)| gain(grade) / discount(i + 1))
        .sum()
}

/// IDCG@k from the full-corpus judgments.
pub fn ideal_dcg_at_k(judgments: &JudgmentVector, k: usize) -> f64 {
    dcg_at_k(judgments.ideal_order().into_iter().map(|(_, g)| g), k)
}

/// Evaluate a ranked list against judgments covering the whole corpus.
///
/// Fails if the judgments miss a corpus document, name a document outside the
/// corpus, or the ranking contains an unjudged document.
pub fn evaluate(
    ranked: &[ScoredResult],
    judgments: &JudgmentVector,
    index: &CorpusIndex,
    k: usize,
) -> Result<NdcgScore, EvaluationError> {
    judgments.check_coverage(index)?;

    let grades = ranked
        .iter()
        .take(k)
        .map(|r| {
            judgments
                .grade(&r.id)
                .ok_or_else(|| EvaluationError::UnknownDocument(r.id.as_str().to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let dcg = dcg_at_k(grades, k);
    let idcg = ideal_dcg_at_k(judgments, k);
    let ndcg = if idcg == 0.0 { 0.0 } else { dcg / idcg };

    debug_assert!((0.0..=1.0 + 1e-12).contains(&ndcg), "ndcg {ndcg} out of range [0, 1]");

    Ok(NdcgScore { k, dcg, idcg, ndcg })
}

pub fn ndcg_at_k(
    ranked: &[ScoredResult],
    judgments: &JudgmentVector,
    index: &CorpusIndex,
    k: usize,
) -> Result<f64, EvaluationError> {
    evaluate(ranked, judgments, index, k).map(|score| score.ndcg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_is_exponential() {
        assert_eq!(gain(RelevanceGrade::NotRelevant), 0.0);
        assert_eq!(gain(RelevanceGrade::Partial), 1.0);
        assert_eq!(gain(RelevanceGrade::High), 3.0);
    }

    #[test]
    fn first_position_is_undiscounted() {
        assert_eq!(discount(1), 1.0);
        let dcg = dcg_at_k([RelevanceGrade::High, RelevanceGrade::Partial], 2);
        assert!((dcg - (3.0 + 1.0 / 3f64.log2())).abs() < 1e-12);
    }

    #[test]
    fn cutoff_limits_positions() {
        let dcg = dcg_at_k([RelevanceGrade::NotRelevant, RelevanceGrade::High], 1);
        assert_eq!(dcg, 0.0);
    }
}
