use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::document::Document;
use crate::evaluation::RelevanceGrade;

use super::JudgeError;

/// Everything that can change a judgment.
///
/// The document contributes its content version, so editing a document's text
/// invalidates its cached grades.
#[derive(Debug, Clone, Copy)]
pub struct CacheKey<'a> {
    pub backend: &'a str,
    pub gemini_model: &'a str,
    pub groq_model: &'a str,
    pub query: &'a str,
    pub document: &'a Document,
}

impl CacheKey<'_> {
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for part in [
            self.backend,
            self.gemini_model,
            self.groq_model,
            self.query,
            self.document.id.as_str(),
            self.document.version.as_str(),
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }
}

/// Persistent map from [`CacheKey`] digests to grades.
///
/// Stored as one JSON object. Keys are sorted on disk so the file diffs cleanly.
#[derive(Debug)]
pub struct JudgmentCache {
    path: PathBuf,
    grades: BTreeMap<String, u8>,
    dirty: bool,
}

impl JudgmentCache {
    /// Open the cache at `path`. A missing file is an empty cache; an
    /// unreadable one is discarded with a warning.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, JudgeError> {
        let path = path.into();
        let grades = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, u8>>(&raw) {
                Ok(grades) => grades,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "judge cache is corrupt; starting empty");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), entries = grades.len(), "judge cache opened");
        Ok(Self {
            path,
            grades,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.grades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grades.is_empty()
    }

    /// Entries holding an out-of-range value count as misses.
    pub fn get(&self, key: &CacheKey<'_>) -> Option<RelevanceGrade> {
        self.grades
            .get(&key.digest())
            .and_then(|raw| RelevanceGrade::try_from(*raw).ok())
    }

    pub fn insert(&mut self, key: &CacheKey<'_>, grade: RelevanceGrade) {
        self.grades.insert(key.digest(), grade.value());
        self.dirty = true;
    }

    /// Write pending entries: temp file in the same directory, then rename.
    pub fn save(&mut self) -> Result<(), JudgeError> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let file = fs::File::create(&temp_path)?;
        serde_json::to_writer(&file, &self.grades)?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.path)?;

        self.dirty = false;
        debug!(path = %self.path.display(), entries = self.grades.len(), "judge cache saved");
        Ok(())
    }
}
