pub mod judgments;
pub mod ndcg;

use thiserror::Error;

pub use judgments::{JudgmentVector, RelevanceGrade};
pub use ndcg::{dcg_at_k, evaluate, ideal_dcg_at_k, ndcg_at_k, NdcgScore};

/// Invalid evaluation input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("No judgment for corpus document {0}")]
    MissingJudgment(String),
    #[error("Document {0} is not part of the corpus")]
    UnknownDocument(String),
    #[error("Relevance grade {0} is outside 0..=2")]
    InvalidGrade(i64),
}
