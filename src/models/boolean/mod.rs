pub mod lexer;
pub mod parser;

use std::collections::BTreeSet;
use std::fmt;

use crate::document::DocumentId;
use crate::index::CorpusIndex;
use crate::ranking::RankingError;
use crate::types::results::{Query, ScoredResult};

use super::Scorer;

pub use parser::{parse, SyntaxError};

/// Boolean query tree. Operands are single normalized terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Term(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Build the operand for one query word.
    ///
    /// A word the analyzer drops (a stop word) stays a term that no indexed
    /// document contains; a word split into several terms becomes their
    /// conjunction.
    pub(crate) fn from_terms(word: &str, terms: &[String]) -> Self {
        let mut iter = terms.iter();
        let Some(first) = iter.next() else {
            return Expr::Term(word.to_string());
        };
        iter.fold(Expr::Term(first.clone()), |acc, term| {
            Expr::And(Box::new(acc), Box::new(Expr::Term(term.clone())))
        })
    }

    /// Documents satisfying the expression.
    pub fn evaluate(&self, index: &CorpusIndex) -> BTreeSet<DocumentId> {
        match self {
            Expr::Term(term) => index
                .documents()
                .iter()
                .filter(|doc| doc.contains(term))
                .map(|doc| doc.id.clone())
                .collect(),
            Expr::Not(inner) => {
                let excluded = inner.evaluate(index);
                index
                    .ids()
                    .filter(|id| !excluded.contains(*id))
                    .cloned()
                    .collect()
            }
            Expr::And(lhs, rhs) => {
                let left = lhs.evaluate(index);
                let right = rhs.evaluate(index);
                left.intersection(&right).cloned().collect()
            }
            Expr::Or(lhs, rhs) => {
                let mut matches = lhs.evaluate(index);
                matches.extend(rhs.evaluate(index));
                matches
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Term(term) => f.write_str(term),
            Expr::Not(inner) => write!(f, "NOT {inner}"),
            Expr::And(lhs, rhs) => write!(f, "({lhs} AND {rhs})"),
            Expr::Or(lhs, rhs) => write!(f, "({lhs} OR {rhs})"),
        }
    }
}

/// Set-based boolean retrieval.
///
/// Only matching documents are returned, each with score 1.0.
#[derive(Debug, Default, Clone, Copy)]
pub struct BooleanModel;

impl BooleanModel {
    pub const MATCH_SCORE: f64 = 1.0;

    pub fn matches(index: &CorpusIndex, raw: &str) -> Result<BTreeSet<DocumentId>, SyntaxError> {
        let expr = parse(raw, index.analyzer())?;
        Ok(expr.evaluate(index))
    }
}

impl Scorer for BooleanModel {
    fn name(&self) -> &'static str {
        "Boolean (AND/OR/NOT)"
    }

    fn score(&self, index: &CorpusIndex, query: &Query) -> Result<Vec<ScoredResult>, RankingError> {
        let matches = Self::matches(index, &query.raw)?;
        Ok(matches
            .into_iter()
            .map(|id| ScoredResult::new(id, Self::MATCH_SCORE))
            .collect())
    }
}
