//! The four retrieval models behind one [`Scorer`] seam.
//!
//! Every model is a pure function of `(corpus index, query)`. Models return
//! unordered scores; ordering and truncation belong to
//! [`Ranker`](crate::ranking::Ranker).

pub mod bm25;
pub mod boolean;
pub mod language_model;
pub mod vector_space;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ModelParams;
use crate::index::CorpusIndex;
use crate::ranking::RankingError;
use crate::types::results::{Query, ScoredResult};

pub use bm25::Bm25Model;
pub use boolean::{BooleanModel, Expr, SyntaxError};
pub use language_model::JelinekMercerModel;
pub use vector_space::VectorSpaceModel;

pub trait Scorer {
    /// Human-readable model name used in reports.
    fn name(&self) -> &'static str;

    /// Score every document this model considers scorable, in any order.
    ///
    /// Each document appears at most once.
    fn score(&self, index: &CorpusIndex, query: &Query) -> Result<Vec<ScoredResult>, RankingError>;
}

impl<S: Scorer + ?Sized> Scorer for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn score(&self, index: &CorpusIndex, query: &Query) -> Result<Vec<ScoredResult>, RankingError> {
        (**self).score(index, query)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    VectorSpace,
    Bm25,
    LanguageModel,
    Boolean,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::VectorSpace,
        ModelKind::Bm25,
        ModelKind::LanguageModel,
        ModelKind::Boolean,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::VectorSpace => "Vector Space (TF-IDF)",
            ModelKind::Bm25 => "Probabilistic (BM25)",
            ModelKind::LanguageModel => "Language Model (Jelinek-Mercer)",
            ModelKind::Boolean => "Boolean (AND/OR/NOT)",
        }
    }

    /// Short selector name accepted by [`FromStr`].
    pub fn key(&self) -> &'static str {
        match self {
            ModelKind::VectorSpace => "vsm",
            ModelKind::Bm25 => "bm25",
            ModelKind::LanguageModel => "lm",
            ModelKind::Boolean => "boolean",
        }
    }

    pub fn scorer(&self, params: &ModelParams) -> Box<dyn Scorer + Send + Sync> {
        match self {
            ModelKind::VectorSpace => Box::new(VectorSpaceModel),
            ModelKind::Bm25 => Box::new(Bm25Model::new(params.k1, params.b)),
            ModelKind::LanguageModel => Box::new(JelinekMercerModel::new(params.lambda)),
            ModelKind::Boolean => Box::new(BooleanModel),
        }
    }
}

impl FromStr for ModelKind {
    type Err = RankingError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_lowercase().as_str() {
            "vsm" | "tfidf" | "tf-idf" | "vector" | "vector_space" => Ok(ModelKind::VectorSpace),
            "bm25" | "probabilistic" => Ok(ModelKind::Bm25),
            "lm" | "jm" | "language_model" | "jelinek-mercer" => Ok(ModelKind::LanguageModel),
            "boolean" | "bool" => Ok(ModelKind::Boolean),
            _ => Err(RankingError::UnknownModel(name.to_string())),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
