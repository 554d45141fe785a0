use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ModelParams;
use crate::document::Analyzer;
use crate::types::identifiers::{CorpusVersion, DocumentId};

/// A query as typed, plus its analyzed terms.
///
/// Terms go through the same analyzer as the indexed documents. The boolean
/// model parses `raw` instead of using `terms`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub raw: String,
    pub terms: Vec<String>,
}

impl Query {
    pub fn new(raw: impl Into<String>, analyzer: &Analyzer) -> Self {
        let raw = raw.into();
        let terms = analyzer.analyze(&raw);
        Self { raw, terms }
    }
}

/// One entry of a ranked list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub id: DocumentId,
    pub score: f64,
}

impl ScoredResult {
    pub fn new(id: DocumentId, score: f64) -> Self {
        Self { id, score }
    }
}

/// Outcome of one model on one query.
///
/// A model that rejects the query gets an empty ranking, nDCG 0 and the
/// rejection message in `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRun {
    pub model: String,
    pub ranked: Vec<ScoredResult>,
    pub ndcg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryReport {
    pub query: String,
    /// Grade of every corpus document, keyed by identifier.
    pub judgments: BTreeMap<DocumentId, u8>,
    pub models: Vec<ModelRun>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model: String,
    pub mean_ndcg: f64,
}

/// Which oracle produced the judgments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeDescription {
    pub backend: String,
    pub gemini_model: Option<String>,
    pub groq_model: Option<String>,
    pub cache_path: Option<String>,
}

/// The full result of a comparative run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub metric: String,
    pub top_k: usize,
    pub generated_at: DateTime<Utc>, // informational only
    pub corpus_version: CorpusVersion,
    pub params: ModelParams,
    pub judge: JudgeDescription,
    pub queries: Vec<String>,
    pub per_query: Vec<QueryReport>,
    pub summary: Vec<ModelSummary>,
}
