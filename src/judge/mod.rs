//! Relevance oracles: who decides how relevant each corpus document is.

pub mod cache;
pub mod heuristic;
pub mod llm;
pub mod remote;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::evaluation::{EvaluationError, JudgmentVector};
use crate::index::CorpusIndex;
use crate::types::results::JudgeDescription;

pub use cache::{CacheKey, JudgmentCache};
pub use heuristic::HeuristicJudge;
pub use llm::{LlmJudge, ResolvedBackend};

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("{0} judge selected but no API key is configured")]
    NotConfigured(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{backend} API returned status {status}: {body}")]
    Api {
        backend: &'static str,
        status: u16,
        body: String,
    },

    #[error("{backend} reply has no 0/1/2 grade: {reply:?}")]
    MalformedResponse { backend: &'static str, reply: String },

    #[error("No judgments available for query: {0}")]
    UnknownQuery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid judgments: {0}")]
    InvalidJudgments(#[from] EvaluationError),
}

/// Supplies a grade for every corpus document given a query.
pub trait RelevanceOracle {
    fn describe(&self) -> JudgeDescription;

    fn judge(&self, query: &str, index: &CorpusIndex) -> Result<JudgmentVector, JudgeError>;
}

/// Judgments fixed up front, for tests and hand-labelled query sets.
#[derive(Debug, Clone, Default)]
pub struct FixedJudgments {
    fallback: Option<JudgmentVector>,
    per_query: BTreeMap<String, JudgmentVector>,
}

impl FixedJudgments {
    /// The same judgments for every query.
    pub fn uniform(judgments: JudgmentVector) -> Self {
        Self {
            fallback: Some(judgments),
            per_query: BTreeMap::new(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>, judgments: JudgmentVector) -> Self {
        self.per_query.insert(query.into(), judgments);
        self
    }
}

impl RelevanceOracle for FixedJudgments {
    fn describe(&self) -> JudgeDescription {
        JudgeDescription {
            backend: "fixed".to_string(),
            gemini_model: None,
            groq_model: None,
            cache_path: None,
        }
    }

    fn judge(&self, query: &str, _index: &CorpusIndex) -> Result<JudgmentVector, JudgeError> {
        self.per_query
            .get(query)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| JudgeError::UnknownQuery(query.to_string()))
    }
}
