use std::cmp::Ordering;

use thiserror::Error;
use tracing::debug;

use crate::config::ModelParams;
use crate::index::CorpusIndex;
use crate::models::{ModelKind, Scorer, SyntaxError};
use crate::types::results::{Query, ScoredResult};

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Boolean query syntax error: {0}")]
    Syntax(#[from] SyntaxError),
}

/// Turns a model's scores into a ranked list.
pub struct Ranker<S> {
    scorer: S,
}

impl Ranker<Box<dyn Scorer + Send + Sync>> {
    /// Select a model by name (`vsm`, `bm25`, `lm`, `boolean`, ...).
    pub fn by_name(name: &str, params: &ModelParams) -> Result<Self, RankingError> {
        let kind: ModelKind = name.parse()?;
        Ok(Self::new(kind.scorer(params)))
    }
}

impl<S> Ranker<S>
where
    S: Scorer,
{
    pub fn new(scorer: S) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Score, order by (score desc, id asc) and optionally keep the top `k`.
    pub fn rank(
        &self,
        index: &CorpusIndex,
        query: &Query,
        top_k: Option<usize>,
    ) -> Result<Vec<ScoredResult>, RankingError> {
        let mut ranked = self.scorer.score(index, query)?;
        sort_ranked(&mut ranked);

        debug_assert!(
            ranked.windows(2).all(|w| {
                let a = &w[0];
                let b = &w[1];
                a.score > b.score || (a.score == b.score && a.id < b.id)
            }),
            "ranked list must be strictly ordered and free of duplicates"
        );

        if let Some(k) = top_k {
            ranked.truncate(k);
        }

        debug!(
            model = self.scorer.name(),
            query = %query.raw,
            returned = ranked.len(),
            "ranked"
        );
        Ok(ranked)
    }
}

/// Sort globally by (score desc, id asc).
pub fn sort_ranked(results: &mut [ScoredResult]) {
    results.sort_by(|a, b| {
        // Descending score
        let score_cmp = b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal);
        if score_cmp != Ordering::Equal {
            score_cmp
        } else {
            // Ascending ID
            a.id.cmp(&b.id)
        }
    });
}
