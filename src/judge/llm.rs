use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::{JudgeBackend, JudgeConfig};
use crate::document::Document;
use crate::evaluation::{JudgmentVector, RelevanceGrade};
use crate::index::CorpusIndex;
use crate::types::results::JudgeDescription;

use super::cache::{CacheKey, JudgmentCache};
use super::heuristic::HeuristicJudge;
use super::remote::{http_client, judge_prompt, parse_grade, GeminiClient, GroqClient};
use super::{JudgeError, RelevanceOracle};

/// Concrete backend after resolving `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBackend {
    Gemini,
    Groq,
    Heuristic,
}

impl ResolvedBackend {
    /// `auto` prefers Gemini, then Groq, then the heuristic.
    pub fn resolve(config: &JudgeConfig) -> Self {
        match config.backend {
            JudgeBackend::Gemini => ResolvedBackend::Gemini,
            JudgeBackend::Groq => ResolvedBackend::Groq,
            JudgeBackend::Heuristic => ResolvedBackend::Heuristic,
            JudgeBackend::Auto if config.gemini_configured() => ResolvedBackend::Gemini,
            JudgeBackend::Auto if config.groq_configured() => ResolvedBackend::Groq,
            JudgeBackend::Auto => ResolvedBackend::Heuristic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedBackend::Gemini => "gemini",
            ResolvedBackend::Groq => "groq",
            ResolvedBackend::Heuristic => "heuristic",
        }
    }
}

/// Cache hit/miss counters for one judge.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicUsize,
    pub misses: AtomicUsize,
}

/// Grades every corpus document with an LLM, falling back to the heuristic
/// when no API key is configured. Grades are cached on disk.
///
/// A backend forced by configuration but missing its key still serves cached
/// grades; only a cache miss fails.
pub struct LlmJudge {
    config: JudgeConfig,
    backend: ResolvedBackend,
    gemini: Option<GeminiClient>,
    groq: Option<GroqClient>,
    cache: Mutex<JudgmentCache>,
    stats: CacheStats,
}

impl LlmJudge {
    pub fn new(config: JudgeConfig) -> Result<Self, JudgeError> {
        let backend = ResolvedBackend::resolve(&config);
        let cache = JudgmentCache::open(&config.cache_path)?;

        let gemini = match (backend, config.gemini_api_key.as_deref()) {
            (ResolvedBackend::Gemini, Some(key)) if !key.is_empty() => Some(GeminiClient::new(
                http_client(config.timeout)?,
                key,
                &config.gemini_model,
                config.effective_min_delay(),
                config.max_retries,
            )),
            _ => None,
        };
        let groq = match (backend, config.groq_api_key.as_deref()) {
            (ResolvedBackend::Groq, Some(key)) if !key.is_empty() => Some(GroqClient::new(
                http_client(config.timeout)?,
                key,
                &config.groq_model,
            )),
            _ => None,
        };

        info!(
            requested = config.backend.as_str(),
            backend = backend.as_str(),
            cache = %config.cache_path.display(),
            cached_entries = cache.len(),
            "relevance judge ready"
        );

        Ok(Self {
            config,
            backend,
            gemini,
            groq,
            cache: Mutex::new(cache),
            stats: CacheStats::default(),
        })
    }

    pub fn backend(&self) -> ResolvedBackend {
        self.backend
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    fn grade_uncached(&self, query: &str, document: &Document) -> Result<RelevanceGrade, JudgeError> {
        let reply = match self.backend {
            ResolvedBackend::Heuristic => return Ok(HeuristicJudge.grade(query, &document.text)),
            ResolvedBackend::Gemini => self
                .gemini
                .as_ref()
                .ok_or(JudgeError::NotConfigured("gemini"))?
                .complete(&judge_prompt(query, &document.text))?,
            ResolvedBackend::Groq => self
                .groq
                .as_ref()
                .ok_or(JudgeError::NotConfigured("groq"))?
                .complete(&judge_prompt(query, &document.text))?,
        };

        match parse_grade(&reply) {
            Some(grade) => Ok(grade),
            None => {
                warn!(document = %document.id, reply = %reply, "judge reply carries no grade");
                Err(JudgeError::MalformedResponse {
                    backend: self.backend.as_str(),
                    reply,
                })
            }
        }
    }

    fn judge_documents(
        &self,
        query: &str,
        index: &CorpusIndex,
        judgments: &mut JudgmentVector,
    ) -> Result<(), JudgeError> {
        for document in index.documents() {
            let key = CacheKey {
                backend: self.config.backend.as_str(),
                gemini_model: &self.config.gemini_model,
                groq_model: &self.config.groq_model,
                query,
                document,
            };

            let cached = self.cache.lock().get(&key);
            let grade = match cached {
                Some(grade) => {
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(document = %document.id, grade = grade.value(), "judge cache hit");
                    grade
                }
                None => {
                    self.stats.misses.fetch_add(1, Ordering::Relaxed);
                    let grade = self.grade_uncached(query, document)?;
                    debug!(document = %document.id, grade = grade.value(), "judge cache miss");
                    self.cache.lock().insert(&key, grade);
                    grade
                }
            };
            judgments.insert(document.id.clone(), grade);
        }
        Ok(())
    }
}

impl RelevanceOracle for LlmJudge {
    fn describe(&self) -> JudgeDescription {
        JudgeDescription {
            backend: self.backend.as_str().to_string(),
            gemini_model: Some(self.config.gemini_model.clone()),
            groq_model: Some(self.config.groq_model.clone()),
            cache_path: Some(self.config.cache_path.display().to_string()),
        }
    }

    fn judge(&self, query: &str, index: &CorpusIndex) -> Result<JudgmentVector, JudgeError> {
        let mut judgments = JudgmentVector::new();
        let outcome = self.judge_documents(query, index, &mut judgments);

        // Keep grades obtained before a failure.
        self.cache.lock().save()?;
        outcome?;

        info!(
            query,
            documents = judgments.len(),
            cache_hits = self.stats.hits.load(Ordering::Relaxed),
            cache_misses = self.stats.misses.load(Ordering::Relaxed),
            "query judged"
        );
        Ok(judgments)
    }
}
