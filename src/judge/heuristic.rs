use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::evaluation::{JudgmentVector, RelevanceGrade};
use crate::index::CorpusIndex;
use crate::types::results::JudgeDescription;

use super::{JudgeError, RelevanceOracle};

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"[\w']+").expect("valid word regex");
}

const MIN_WORD_LEN: usize = 3;

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
}

/// Deterministic lexical-overlap judge used when no remote judge is available.
///
/// The share of query words (three characters or more) found in the document
/// decides the grade: at least 0.6 is highly relevant, at least 0.25 partially.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicJudge;

impl HeuristicJudge {
    pub fn grade(&self, query: &str, text: &str) -> RelevanceGrade {
        let query_words: Vec<String> = words(query).collect();
        if query_words.is_empty() {
            return RelevanceGrade::NotRelevant;
        }
        let doc_words: HashSet<String> = words(text).collect();

        let overlap = query_words.iter().filter(|w| doc_words.contains(*w)).count();
        let ratio = overlap as f64 / query_words.len() as f64;
        if ratio >= 0.6 {
            RelevanceGrade::High
        } else if ratio >= 0.25 {
            RelevanceGrade::Partial
        } else {
            RelevanceGrade::NotRelevant
        }
    }
}

impl RelevanceOracle for HeuristicJudge {
    fn describe(&self) -> JudgeDescription {
        JudgeDescription {
            backend: "heuristic".to_string(),
            gemini_model: None,
            groq_model: None,
            cache_path: None,
        }
    }

    fn judge(&self, query: &str, index: &CorpusIndex) -> Result<JudgmentVector, JudgeError> {
        let mut judgments = JudgmentVector::new();
        for doc in index.documents() {
            judgments.insert(doc.id.clone(), self.grade(query, &doc.text));
        }
        Ok(judgments)
    }
}
