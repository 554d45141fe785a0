use std::collections::BTreeMap;

use crate::types::identifiers::{DocumentId, DocumentVersion};
use super::analyzer::Analyzer;

/// One document of the collection, with its derived term statistics.
///
/// Immutable after ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub version: DocumentVersion,
    pub text: String,
    term_counts: BTreeMap<String, usize>,
    length: usize,
}

impl Document {
    /// Ingest raw text into a Document.
    ///
    /// The version is a hash of the raw text; term counts and length come from
    /// the analyzer, so the same analyzer must be used for queries.
    pub fn ingest(id: DocumentId, text: impl Into<String>, analyzer: &Analyzer) -> Self {
        let text = text.into();
        let version = DocumentVersion::from_content(text.as_bytes());

        let terms = analyzer.analyze(&text);
        let length = terms.len();
        let mut term_counts = BTreeMap::new();
        for term in terms {
            *term_counts.entry(term).or_insert(0) += 1;
        }

        Document {
            id,
            version,
            text,
            term_counts,
            length,
        }
    }

    pub fn term_frequency(&self, term: &str) -> usize {
        self.term_counts.get(term).copied().unwrap_or(0)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.term_counts.contains_key(term)
    }

    /// Total term occurrences after analysis.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Distinct terms with their counts, in term order.
    pub fn term_counts(&self) -> impl Iterator<Item = (&str, usize)> {
        self.term_counts.iter().map(|(t, c)| (t.as_str(), *c))
    }
}
