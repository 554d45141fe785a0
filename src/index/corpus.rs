use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::DocumentId;
use crate::index::corpus_index::IndexError;

/// One raw `(identifier, text)` pair as supplied by the corpus source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub id: DocumentId,
    pub text: String,
}

/// Ordered snapshot of the document collection.
///
/// Order is display order only; it never affects scores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

impl Corpus {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<DocumentId>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(id, text)| CorpusEntry {
                id: id.into(),
                text: text.into(),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a corpus file.
    ///
    /// Accepted layouts:
    /// - `.jsonl`: one `{"id": ..., "text": ...}` object per line
    /// - JSON array of `{"id": ..., "text": ...}` objects
    /// - JSON object mapping identifier to text (identifier order)
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let corpus = if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            Self::load_jsonl(path)?
        } else {
            Self::load_json(path)?
        };
        debug!(path = %path.display(), documents = corpus.len(), "corpus loaded");
        Ok(corpus)
    }

    fn load_jsonl(path: &Path) -> Result<Self, IndexError> {
        let reader = BufReader::new(File::open(path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str::<CorpusEntry>(&line)?);
        }
        Ok(Self { entries })
    }

    fn load_json(path: &Path) -> Result<Self, IndexError> {
        let reader = BufReader::new(File::open(path)?);
        let json: serde_json::Value = serde_json::from_reader(reader)?;
        match json {
            serde_json::Value::Array(items) => {
                let entries = items
                    .into_iter()
                    .map(serde_json::from_value::<CorpusEntry>)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self { entries })
            }
            serde_json::Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (id, value) in map {
                    match value {
                        serde_json::Value::String(text) => entries.push(CorpusEntry {
                            id: DocumentId::new(id),
                            text,
                        }),
                        _ => return Err(IndexError::InvalidCorpusFile(path.to_path_buf())),
                    }
                }
                Ok(Self { entries })
            }
            _ => Err(IndexError::InvalidCorpusFile(path.to_path_buf())),
        }
    }
}
