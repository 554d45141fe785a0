//! Comparative runs: every model on every query, scored by nDCG@k against one
//! set of judgments per query.

use std::fs;
use std::path::Path;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, ModelParams};
use crate::evaluation::{evaluate, EvaluationError};
use crate::index::CorpusIndex;
use crate::judge::{JudgeError, RelevanceOracle};
use crate::models::ModelKind;
use crate::ranking::Ranker;
use crate::types::results::{BenchmarkReport, ModelRun, ModelSummary, QueryReport};

pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("No queries to evaluate")]
    NoQueries,

    #[error("top_k must be at least 1")]
    InvalidTopK,

    #[error("No models selected")]
    NoModels,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error(transparent)]
    Judge(#[from] JudgeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Benchmark {
    pub models: Vec<ModelKind>,
    pub top_k: usize,
    pub params: ModelParams,
}

impl Default for Benchmark {
    fn default() -> Self {
        Self {
            models: ModelKind::ALL.to_vec(),
            top_k: DEFAULT_TOP_K,
            params: ModelParams::default(),
        }
    }
}

impl Benchmark {
    /// Judge each query once, then rank and evaluate with every model.
    ///
    /// Summary entries follow the order of `models`.
    pub fn run(
        &self,
        index: &CorpusIndex,
        queries: &[String],
        oracle: &dyn RelevanceOracle,
    ) -> Result<BenchmarkReport, BenchError> {
        if queries.is_empty() {
            return Err(BenchError::NoQueries);
        }
        if self.models.is_empty() {
            return Err(BenchError::NoModels);
        }
        if self.top_k == 0 {
            return Err(BenchError::InvalidTopK);
        }
        self.params.validate()?;

        let rankers: Vec<_> = self
            .models
            .iter()
            .map(|kind| (kind, Ranker::new(kind.scorer(&self.params))))
            .collect();

        let mut per_query = Vec::with_capacity(queries.len());
        let mut totals = vec![0.0; rankers.len()];

        for raw in queries {
            let judgments = oracle.judge(raw, index)?;
            judgments.check_coverage(index)?;
            let query = index.query(raw.as_str());

            let mut models = Vec::with_capacity(rankers.len());
            for (slot, (kind, ranker)) in rankers.iter().enumerate() {
                let run = match ranker.rank(index, &query, Some(self.top_k)) {
                    Ok(ranked) => {
                        let score = evaluate(&ranked, &judgments, index, self.top_k)?;
                        info!(query = %raw, model = kind.key(), ndcg = score.ndcg, "evaluated");
                        ModelRun {
                            model: kind.display_name().to_string(),
                            ranked,
                            ndcg: score.ndcg,
                            error: None,
                        }
                    }
                    Err(err) => {
                        warn!(
                            query = %raw,
                            model = kind.key(),
                            error = %err,
                            "model rejected query; scoring nDCG 0"
                        );
                        ModelRun {
                            model: kind.display_name().to_string(),
                            ranked: Vec::new(),
                            ndcg: 0.0,
                            error: Some(err.to_string()),
                        }
                    }
                };
                totals[slot] += run.ndcg;
                models.push(run);
            }

            per_query.push(QueryReport {
                query: raw.clone(),
                judgments: judgments.to_raw(),
                models,
            });
        }

        let summary = rankers
            .iter()
            .zip(&totals)
            .map(|((kind, _), total)| ModelSummary {
                model: kind.display_name().to_string(),
                mean_ndcg: total / queries.len() as f64,
            })
            .collect();

        Ok(BenchmarkReport {
            metric: format!("nDCG@{}", self.top_k),
            top_k: self.top_k,
            generated_at: Utc::now(),
            corpus_version: index.version().clone(),
            params: self.params,
            judge: oracle.describe(),
            queries: queries.to_vec(),
            per_query,
            summary,
        })
    }
}

/// Write the report as pretty JSON: temp file beside the target, then rename.
pub fn write_report(report: &BenchmarkReport, path: &Path) -> Result<(), BenchError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("json.tmp");
    let file = fs::File::create(&temp_path)?;
    serde_json::to_writer_pretty(&file, report)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    info!(path = %path.display(), queries = report.queries.len(), "benchmark report written");
    Ok(())
}
