use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::document::{Analyzer, Document, DocumentId};
use crate::index::corpus::Corpus;
use crate::types::identifiers::CorpusVersion;
use crate::types::results::Query;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Cannot index an empty corpus")]
    EmptyCorpus,
    #[error("Duplicate document ID: {0}")]
    DuplicateDocumentId(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Unsupported corpus file layout: {0}")]
    InvalidCorpusFile(PathBuf),
}

/// Precomputed statistics over a fixed document collection.
///
/// Built once from a [`Corpus`] snapshot and read-only afterwards. A changed
/// collection needs a new index.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    analyzer: Analyzer,
    documents: Vec<Document>,
    positions: BTreeMap<DocumentId, usize>,
    document_frequency: BTreeMap<String, usize>,
    collection_frequency: BTreeMap<String, usize>,
    total_length: usize,
    version: CorpusVersion,
}

impl CorpusIndex {
    pub fn build(corpus: &Corpus) -> Result<Self, IndexError> {
        Self::build_with(corpus, Analyzer::default())
    }

    pub fn build_with(corpus: &Corpus, analyzer: Analyzer) -> Result<Self, IndexError> {
        if corpus.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }

        let mut sorted_ids: Vec<&DocumentId> = corpus.entries().iter().map(|e| &e.id).collect();
        sorted_ids.sort();
        for pair in sorted_ids.windows(2) {
            if pair[0] == pair[1] {
                return Err(IndexError::DuplicateDocumentId(pair[0].as_str().to_string()));
            }
        }

        let documents: Vec<Document> = corpus
            .entries()
            .iter()
            .map(|entry| Document::ingest(entry.id.clone(), entry.text.clone(), &analyzer))
            .collect();

        let mut positions = BTreeMap::new();
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        let mut collection_frequency: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_length = 0;

        for (position, doc) in documents.iter().enumerate() {
            positions.insert(doc.id.clone(), position);
            total_length += doc.len();
            for (term, count) in doc.term_counts() {
                *document_frequency.entry(term.to_string()).or_insert(0) += 1;
                *collection_frequency.entry(term.to_string()).or_insert(0) += count;
            }
        }

        let version =
            CorpusVersion::from_documents(documents.iter().map(|d| (&d.id, &d.version)));

        info!(
            documents = documents.len(),
            vocabulary = document_frequency.len(),
            total_length,
            corpus_version = %version,
            "corpus index built"
        );

        Ok(Self {
            analyzer,
            documents,
            positions,
            document_frequency,
            collection_frequency,
            total_length,
            version,
        })
    }

    /// Convenience constructor from `(id, text)` pairs in corpus order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<DocumentId>,
        V: Into<String>,
    {
        Self::build(&Corpus::new(pairs))
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Normalize text exactly as the documents were normalized.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        self.analyzer.analyze(text)
    }

    pub fn query(&self, raw: impl Into<String>) -> Query {
        let query = Query::new(raw, &self.analyzer);
        debug!(raw = %query.raw, terms = ?query.terms, "query analyzed");
        query
    }

    /// Number of documents (N).
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in corpus order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, id: &DocumentId) -> Option<&Document> {
        self.positions.get(id).map(|&p| &self.documents[p])
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.positions.contains_key(id)
    }

    /// Identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &DocumentId> {
        self.positions.keys()
    }

    pub fn term_frequency(&self, id: &DocumentId, term: &str) -> usize {
        self.document(id).map_or(0, |d| d.term_frequency(term))
    }

    pub fn document_frequency(&self, term: &str) -> usize {
        self.document_frequency.get(term).copied().unwrap_or(0)
    }

    /// Occurrences of `term` across the whole collection.
    pub fn collection_frequency(&self, term: &str) -> usize {
        self.collection_frequency.get(term).copied().unwrap_or(0)
    }

    pub fn document_length(&self, id: &DocumentId) -> Option<usize> {
        self.document(id).map(Document::len)
    }

    pub fn total_length(&self) -> usize {
        self.total_length
    }

    pub fn average_document_length(&self) -> f64 {
        self.total_length as f64 / self.documents.len() as f64
    }

    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.document_frequency.keys().map(String::as_str)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.document_frequency.len()
    }

    pub fn in_vocabulary(&self, term: &str) -> bool {
        self.document_frequency.contains_key(term)
    }

    pub fn version(&self) -> &CorpusVersion {
        &self.version
    }
}
