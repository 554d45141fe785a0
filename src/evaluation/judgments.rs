use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::DocumentId;
use crate::index::CorpusIndex;

use super::EvaluationError;

/// Graded relevance of one document for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RelevanceGrade {
    NotRelevant = 0,
    Partial = 1,
    High = 2,
}

impl RelevanceGrade {
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for RelevanceGrade {
    type Error = EvaluationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RelevanceGrade::NotRelevant),
            1 => Ok(RelevanceGrade::Partial),
            2 => Ok(RelevanceGrade::High),
            other => Err(EvaluationError::InvalidGrade(other.into())),
        }
    }
}

impl From<RelevanceGrade> for u8 {
    fn from(grade: RelevanceGrade) -> Self {
        grade.value()
    }
}

/// Relevance grades for one query, keyed by document.
///
/// Evaluation requires one grade per corpus document; see
/// [`JudgmentVector::check_coverage`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JudgmentVector {
    grades: BTreeMap<DocumentId, RelevanceGrade>,
}

impl JudgmentVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw integer grades, rejecting anything outside {0, 1, 2}.
    pub fn from_grades<I, K>(grades: I) -> Result<Self, EvaluationError>
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<DocumentId>,
    {
        let mut vector = Self::new();
        for (id, raw) in grades {
            let grade = u8::try_from(raw)
                .map_err(|_| EvaluationError::InvalidGrade(raw))
                .and_then(RelevanceGrade::try_from)?;
            vector.insert(id.into(), grade);
        }
        Ok(vector)
    }

    pub fn insert(&mut self, id: DocumentId, grade: RelevanceGrade) {
        self.grades.insert(id, grade);
    }

    pub fn grade(&self, id: &DocumentId) -> Option<RelevanceGrade> {
        self.grades.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.grades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grades.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DocumentId, RelevanceGrade)> {
        self.grades.iter().map(|(id, g)| (id, *g))
    }

    /// The vector must name every corpus document and nothing else.
    pub fn check_coverage(&self, index: &CorpusIndex) -> Result<(), EvaluationError> {
        if let Some(missing) = index.ids().find(|id| !self.grades.contains_key(*id)) {
            return Err(EvaluationError::MissingJudgment(missing.as_str().to_string()));
        }
        if let Some(unknown) = self.grades.keys().find(|id| !index.contains(id)) {
            return Err(EvaluationError::UnknownDocument(unknown.as_str().to_string()));
        }
        Ok(())
    }

    /// Documents ordered by grade descending, then identifier ascending.
    pub fn ideal_order(&self) -> Vec<(&DocumentId, RelevanceGrade)> {
        let mut ordered: Vec<_> = self.iter().collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ordered
    }

    pub fn to_raw(&self) -> BTreeMap<DocumentId, u8> {
        self.grades.iter().map(|(id, g)| (id.clone(), g.value())).collect()
    }
}
