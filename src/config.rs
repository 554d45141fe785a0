use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("k1 must be non-negative, got {0}")]
    InvalidK1(f64),
    #[error("b must lie in [0, 1], got {0}")]
    InvalidB(f64),
    #[error("lambda must lie strictly between 0 and 1, got {0}")]
    InvalidLambda(f64),
}

/// Fixed scoring constants shared by the probabilistic and language models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// BM25 term-frequency saturation.
    pub k1: f64,
    /// BM25 length-normalization strength.
    pub b: f64,
    /// Jelinek-Mercer weight of the document model.
    pub lambda: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            k1: 1.5,
            b: 0.75,
            lambda: 0.5,
        }
    }
}

impl ModelParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.k1 >= 0.0) {
            return Err(ConfigError::InvalidK1(self.k1));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(ConfigError::InvalidB(self.b));
        }
        if !(self.lambda > 0.0 && self.lambda < 1.0) {
            return Err(ConfigError::InvalidLambda(self.lambda));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgeBackend {
    Auto,
    Gemini,
    Groq,
    Heuristic,
}

impl JudgeBackend {
    /// Parse a backend name; unknown names fall back to `Auto` with a warning.
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "auto" | "" => JudgeBackend::Auto,
            "gemini" => JudgeBackend::Gemini,
            "groq" => JudgeBackend::Groq,
            "heuristic" => JudgeBackend::Heuristic,
            other => {
                warn!(backend = other, "unknown judge backend; falling back to auto");
                JudgeBackend::Auto
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JudgeBackend::Auto => "auto",
            JudgeBackend::Gemini => "gemini",
            JudgeBackend::Groq => "groq",
            JudgeBackend::Heuristic => "heuristic",
        }
    }
}

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-flash-lite-latest";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_CACHE_PATH: &str = ".cache/llm_judge_cache.json";

#[derive(Debug, Clone)]
pub struct JudgeConfig {
    pub backend: JudgeBackend,
    pub gemini_model: String,
    pub groq_model: String,
    pub gemini_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub cache_path: PathBuf,
    /// Minimum spacing between Gemini calls. `None` picks a default from the model name.
    pub min_delay: Option<Duration>,
    pub max_retries: u32,
    pub timeout: Duration,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            backend: JudgeBackend::Auto,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            groq_model: DEFAULT_GROQ_MODEL.to_string(),
            gemini_api_key: None,
            groq_api_key: None,
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            min_delay: None,
            max_retries: 2,
            timeout: Duration::from_secs(30),
        }
    }
}

impl JudgeConfig {
    pub fn gemini_configured(&self) -> bool {
        self.gemini_api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn groq_configured(&self) -> bool {
        self.groq_api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Spacing applied before each Gemini call.
    ///
    /// Free-tier `flash-lite` models allow roughly ten requests a minute.
    pub fn effective_min_delay(&self) -> Duration {
        match self.min_delay {
            Some(delay) => delay,
            None if self.gemini_model.to_lowercase().contains("flash-lite") => {
                Duration::from_millis(6500)
            }
            None => Duration::ZERO,
        }
    }
}
